use serde::{Deserialize, Deserializer, Serialize};

pub const ALL_SOURCES: &str = "all";

/// One aggregated listing as served by the deals endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Deal {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub shipping: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Deal {
    pub fn thumbnail(&self) -> Option<&str> {
        non_blank(&self.thumbnail)
    }

    pub fn price(&self) -> Option<&str> {
        non_blank(&self.price)
    }

    pub fn shipping(&self) -> Option<&str> {
        non_blank(&self.shipping)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// A single implicit page holding `len` items.
    pub fn single_page(len: usize) -> Self {
        let len = len as u64;
        Self {
            page: 1,
            per_page: len.clamp(1, u32::MAX as u64) as u32,
            total: len,
            total_pages: 1,
        }
    }

    /// Forces `total_pages >= 1` and `page` into `[1, total_pages]`.
    pub fn normalized(self) -> Self {
        let total_pages = self.total_pages.max(1);
        Self {
            page: self.page.clamp(1, total_pages),
            per_page: self.per_page.max(1),
            total: self.total,
            total_pages,
        }
    }
}

/// Both response shapes the deals endpoint has served over time.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum DealsPayload {
    Paged {
        deals: Vec<Deal>,
        pagination: Pagination,
    },
    List(Vec<Deal>),
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DealPage {
    pub deals: Vec<Deal>,
    pub pagination: Pagination,
}

impl DealsPayload {
    pub fn into_page(self) -> DealPage {
        match self {
            DealsPayload::List(deals) => {
                let pagination = Pagination::single_page(deals.len());
                DealPage { deals, pagination }
            }
            DealsPayload::Paged { deals, pagination } => DealPage {
                deals,
                pagination: pagination.normalized(),
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AiSource {
    pub title: String,
    pub link: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AiAnswer {
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<AiSource>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SourceEntry {
    pub tag: String,
    pub label: String,
}

impl SourceEntry {
    pub fn new(tag: &str, label: &str) -> Self {
        Self {
            tag: tag.to_string(),
            label: label.to_string(),
        }
    }
}

/// Known data sources, used for filter controls and human-readable labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceCatalog {
    all_label: String,
    entries: Vec<SourceEntry>,
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::new(
            "All",
            vec![
                SourceEntry::new("ppomppu", "Ppomppu"),
                SourceEntry::new("ruliweb", "Ruliweb"),
                SourceEntry::new("zod", "Zod"),
            ],
        )
    }
}

impl SourceCatalog {
    pub fn new(all_label: &str, entries: Vec<SourceEntry>) -> Self {
        Self {
            all_label: all_label.to_string(),
            entries,
        }
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn label(&self, tag: &str) -> String {
        if tag == ALL_SOURCES {
            return self.all_label.clone();
        }
        self.entries
            .iter()
            .find(|e| e.tag == tag)
            .map(|e| e.label.clone())
            .unwrap_or_else(|| tag.to_string())
    }

    /// Filter entries in display order, the "all" option first.
    pub fn filters(&self) -> Vec<SourceEntry> {
        let mut out = Vec::with_capacity(self.entries.len() + 1);
        out.push(SourceEntry::new(ALL_SOURCES, &self.all_label));
        out.extend(self.entries.iter().cloned());
        out
    }

    pub fn contains(&self, tag: &str) -> bool {
        tag == ALL_SOURCES || self.entries.iter().any(|e| e.tag == tag)
    }
}
