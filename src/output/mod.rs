pub mod report;

use colored::Colorize;

use crate::view::{Element, Node, Region, View};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn render(view: &View, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(view).into_bytes(),
        OutputFormat::Json => render_json(view),
        OutputFormat::Html => report::render_html(view),
    }
}

pub fn render_json(view: &View) -> Vec<u8> {
    serde_json::to_vec_pretty(&view.snapshot()).unwrap_or_else(|_| b"{}\n".to_vec())
}

const BLOCK_TAGS: [&str; 6] = ["div", "h2", "nav", "section", "p", "a"];

fn markup_to_terminal(markup: &str) -> String {
    let mut out = String::new();
    let mut rest = markup;
    while let Some(start) = rest.find("<strong>") {
        out.push_str(&rest[..start]);
        let after = &rest[start + "<strong>".len()..];
        match after.find("</strong>") {
            Some(end) => {
                out.push_str(&after[..end].bold().to_string());
                rest = &after[end + "</strong>".len()..];
            }
            None => {
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out.replace("<br>", "\n")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn styled(e: &Element, text: String) -> String {
    if e.has_class("active") {
        return text.bold().reversed().to_string();
    }
    if e.has_class("error-panel") {
        return text.red().to_string();
    }
    if e.has_class("deal-price") {
        return text.bold().red().to_string();
    }
    if e.has_class("deal-source") {
        return text.cyan().to_string();
    }
    if e.has_class("deal-title") || e.has_class("ai-source-title") {
        return text.bold().to_string();
    }
    if e.has_class("deal-time") || e.has_class("deal-author") || e.has_class("ai-source-link") {
        return text.dimmed().to_string();
    }
    if e.has_class("loading") || e.has_class("ai-loading") || e.has_class("empty-state") {
        return text.italic().to_string();
    }
    text
}

fn render_node_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(t),
        Node::Markup(m) => out.push_str(&markup_to_terminal(m)),
        Node::Element(e) => {
            if e.tag == "img" {
                return;
            }
            let mut inner = String::new();
            for (i, child) in e.children.iter().enumerate() {
                if i > 0 && e.has_class("deal-meta") {
                    inner.push_str(" · ");
                }
                if i > 0 && (e.has_class("deal-bottom") || e.tag == "nav") {
                    inner.push(' ');
                }
                render_node_text(child, &mut inner);
            }
            let inner = inner.trim_end_matches('\n').to_string();
            let inner = if e.on_click.is_some() {
                format!("[{inner}]")
            } else {
                inner
            };
            out.push_str(&styled(e, inner));
            if BLOCK_TAGS.contains(&e.tag) {
                out.push('\n');
            }
        }
    }
}

fn render_region_text(view: &View, region: Region, out: &mut String) {
    if !view.is_visible(region) {
        return;
    }
    let nodes = view.nodes(region);
    if nodes.is_empty() {
        return;
    }
    let mut body = String::new();
    for node in nodes {
        render_node_text(node, &mut body);
        if region == Region::SourceFilters {
            body.push(' ');
        }
    }
    out.push_str(body.trim_end());
    out.push('\n');
    if region == Region::DealList {
        out.push('\n');
    }
}

/// Terminal rendering of every visible region, in page order.
pub fn render_text(view: &View) -> String {
    let mut out = String::new();
    if let Some(prompt) = view.prompt() {
        out.push_str(&format!("{} {}\n", "!".bold().yellow(), prompt));
    }
    for region in [Region::SourceFilters, Region::DealList, Region::Pagination] {
        render_region_text(view, region, &mut out);
    }
    if view.is_visible(Region::AiResult) {
        out.push_str(&format!("\n{}\n", ":: AI search ::".bold()));
        for region in [
            Region::AiLoading,
            Region::AiAnswer,
            Region::AiSources,
            Region::AiSourceList,
        ] {
            render_region_text(view, region, &mut out);
        }
    }
    out
}
