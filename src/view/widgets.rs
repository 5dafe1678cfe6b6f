//! Pure view-model builders. Every function maps data to a render tree and
//! touches no state, so the trees can be compared directly in tests.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::client::Endpoints;
use crate::model::{AiSource, Deal, SourceEntry};
use crate::pagination::PageControl;
use crate::utils;
use crate::view::{Action, Element, Node};

pub const PLACEHOLDER_IMAGE: &str =
    "https://via.placeholder.com/80x80/e5e7eb/9ca3af?text=No+Image";
pub const NO_PRICE: &str = "No price info";
pub const EMPTY_DEALS: &str = "No hot deals to show.";
pub const AI_LOADING: &str = "Searching for an answer...";
pub const ICON_EXPANDED: &str = "▲";
pub const ICON_COLLAPSED: &str = "▼";

const PANEL: &str = "p-4 text-center rounded-lg shadow";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardLayout {
    #[default]
    Full,
    Compact,
}

impl CardLayout {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "full" => Some(Self::Full),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

pub fn loading(source_label: &str, page: u32) -> Node {
    Element::new("div")
        .class(PANEL)
        .class("loading text-gray-500 bg-white")
        .child(
            Element::new("span")
                .class("animate-pulse")
                .text(format!(
                    "Loading the latest hot deals... ({source_label}, page {page})"
                )),
        )
        .into()
}

pub fn empty_state() -> Node {
    Element::new("div")
        .class(PANEL)
        .class("empty-state text-gray-500 bg-white")
        .text(EMPTY_DEALS)
        .into()
}

pub fn error_panel(message: &str) -> Node {
    Element::new("div")
        .class(PANEL)
        .class("error-panel text-red-500 bg-red-50")
        .text(format!("Failed to load data: {message}"))
        .into()
}

fn thumbnail(deal: &Deal, endpoints: &Endpoints) -> Element {
    let src = match deal.thumbnail() {
        Some(url) => endpoints.image_proxy(url, &deal.source),
        None => PLACEHOLDER_IMAGE.to_string(),
    };
    Element::new("img")
        .class("thumbnail w-20 h-20 object-cover rounded-md border border-gray-200 flex-shrink-0")
        .attr("src", src)
        .attr("alt", deal.title.clone())
        .attr("data-fallback", PLACEHOLDER_IMAGE)
}

/// One clickable deal card. `Compact` shortens the title.
pub fn deal_card(
    deal: &Deal,
    endpoints: &Endpoints,
    now: DateTime<Local>,
    layout: CardLayout,
) -> Node {
    let mut meta = Element::new("div")
        .class("deal-meta flex items-center space-x-2 text-xs text-gray-500")
        .child(
            Element::new("span")
                .class("deal-source font-bold px-2 py-0.5 bg-gray-200 text-gray-700 rounded-full")
                .text(deal.source.clone()),
        )
        .child(
            Element::new("span")
                .class("deal-author")
                .text(format!("by {}", deal.author)),
        );
    if let Some(ago) = deal
        .created_at
        .as_deref()
        .and_then(|ts| utils::time_ago(ts, now))
    {
        meta = meta.child(Element::new("span").class("deal-time").text(ago));
    }

    let title_text = match layout {
        CardLayout::Full => deal.title.clone(),
        CardLayout::Compact => utils::truncate_title(&deal.title, utils::TITLE_MAX_CHARS),
    };
    let title = Element::new("h2")
        .class("deal-title text-base font-bold text-gray-800 leading-tight my-1")
        .attr("title", deal.title.clone())
        .text(title_text);

    let mut bottom = Element::new("div")
        .class("deal-bottom flex items-baseline space-x-2")
        .child(
            Element::new("span")
                .class("deal-price text-lg font-bold text-red-500")
                .text(deal.price().unwrap_or(NO_PRICE)),
        );
    if let Some(shipping) = deal.shipping() {
        bottom = bottom.child(
            Element::new("span")
                .class("deal-shipping text-sm text-gray-600")
                .text(shipping),
        );
    }

    let content = Element::new("div")
        .class("flex-grow flex flex-col justify-between")
        .child(meta)
        .child(title)
        .child(bottom);

    Element::new("a")
        .class("deal-card block bg-white p-4 rounded-lg shadow transition-all duration-300")
        .attr("href", deal.link.clone())
        .attr("target", "_blank")
        .child(
            Element::new("div")
                .class("flex items-start space-x-4")
                .child(thumbnail(deal, endpoints))
                .child(content),
        )
        .into()
}

fn page_button(label: String, target: u32, class: &str) -> Node {
    Element::new("button")
        .class("page-btn px-3 py-1 rounded border")
        .class(class)
        .attr("data-page", target.to_string())
        .on_click(Action::LoadPage(target))
        .text(label)
        .into()
}

pub fn pagination(controls: &[PageControl]) -> Vec<Node> {
    if controls.is_empty() {
        return vec![];
    }
    let items = controls.iter().map(|control| match *control {
        PageControl::Previous(target) => page_button("Previous".to_string(), target, "page-prev"),
        PageControl::Next(target) => page_button("Next".to_string(), target, "page-next"),
        PageControl::Page { number, active } => page_button(
            number.to_string(),
            number,
            if active {
                "page-number active bg-red-500 text-white"
            } else {
                "page-number bg-white"
            },
        ),
        PageControl::Gap => Element::new("span")
            .class("page-gap px-2 text-gray-400")
            .text("...")
            .into(),
    });
    vec![Element::new("nav")
        .class("pagination flex justify-center space-x-1 mt-4")
        .children(items)
        .into()]
}

pub fn source_filters(entries: &[SourceEntry], active: &str) -> Vec<Node> {
    entries
        .iter()
        .map(|entry| {
            let mut button = Element::new("button")
                .class("source-btn px-3 py-1 rounded-full")
                .attr("data-source", entry.tag.clone())
                .on_click(Action::SelectSource(entry.tag.clone()))
                .text(entry.label.clone());
            if entry.tag == active {
                button = button.class("active");
            }
            button.into()
        })
        .collect()
}

pub fn ai_loading() -> Node {
    Element::new("div")
        .class("ai-loading animate-pulse text-gray-500")
        .text(AI_LOADING)
        .into()
}

pub fn ai_answer(markup: String) -> Node {
    Element::new("div")
        .class("ai-answer-text text-gray-800 leading-relaxed")
        .child(Node::Markup(markup))
        .into()
}

pub fn ai_failure(message: &str) -> Node {
    Element::new("div")
        .class("ai-answer-text error-panel text-red-500")
        .text(message)
        .into()
}

/// Header of the collapsible source section; the icon tracks `expanded`.
pub fn ai_sources_header(count: usize, expanded: bool) -> Node {
    let icon = if expanded {
        ICON_EXPANDED
    } else {
        ICON_COLLAPSED
    };
    Element::new("button")
        .class("ai-sources-toggle flex items-center justify-between w-full font-bold")
        .attr("aria-expanded", expanded.to_string())
        .on_click(Action::ToggleSources)
        .child(
            Element::new("span")
                .class("ai-sources-count")
                .text(format!("Sources ({count})")),
        )
        .child(Element::new("span").class("toggle-icon").text(icon))
        .into()
}

pub fn ai_source_card(source: &AiSource) -> Node {
    Element::new("a")
        .class("ai-source-card block p-2 rounded border hover:bg-gray-50")
        .attr("href", source.link.clone())
        .attr("target", "_blank")
        .child(
            Element::new("div")
                .class("ai-source-title font-semibold text-sm")
                .text(source.title.clone()),
        )
        .child(
            Element::new("div")
                .class("ai-source-link text-xs text-blue-500 truncate")
                .text(source.link.clone()),
        )
        .into()
}
