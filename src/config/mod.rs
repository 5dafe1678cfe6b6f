use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::model::{SourceCatalog, SourceEntry};

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    #[serde(alias = "backend")]
    pub url: Option<String>,
    pub source: Option<String>,
    pub per_page: Option<u32>,
    pub timeout: Option<u64>,
    pub layout: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub all_label: Option<String>,
    pub sources: Option<Vec<SourceEntry>>,
    pub no_color: Option<bool>,
}

impl ConfigFile {
    pub fn source_catalog(&self) -> SourceCatalog {
        let defaults = SourceCatalog::default();
        match (&self.all_label, &self.sources) {
            (None, None) => defaults,
            (label, entries) => {
                let entries = entries
                    .clone()
                    .unwrap_or_else(|| defaults.entries().to_vec());
                SourceCatalog::new(label.as_deref().unwrap_or("All"), entries)
            }
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".hotdeals").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# hotdeals config
#
# Location (default):
#   ~/.hotdeals/config.yml

# Backend serving /api/hotdeals, /api/search/ai and /image-proxy
url: http://localhost:8000/

# Listing
source: all
per_page: 20
# full | compact (compact truncates long titles)
layout: full

# Request timeout in seconds (unset = wait indefinitely)
# timeout: 10

# Output (optional)
# output: ./deals.html
# output_format: html

# Source filters
all_label: All
sources:
  - tag: ppomppu
    label: Ppomppu
  - tag: ruliweb
    label: Ruliweb
  - tag: zod
    label: Zod

# Output styling
no_color: false
"#
    .to_string()
}

/// Writes the commented default config unless one exists. Returns whether
/// a file was created.
pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
