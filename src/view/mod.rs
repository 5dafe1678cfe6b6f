pub mod widgets;

use std::collections::BTreeMap;

use serde::Serialize;

/// What activating a control asks the controllers to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Action {
    LoadPage(u32),
    SelectSource(String),
    ToggleSources,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_click: Option<Action>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text(String),
    /// Pre-rendered inline markup, emitted without escaping.
    Markup(String),
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
            on_click: None,
        }
    }

    /// Adds whitespace-separated class names.
    pub fn class(mut self, classes: &str) -> Self {
        self.classes.extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn on_click(mut self, action: Action) -> Self {
        self.on_click = Some(action);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Concatenated text of this subtree. Markup contributes its raw source.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) | Node::Markup(t) => out.push_str(t),
            Node::Element(e) => e.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Depth-first visit of every element in this subtree.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        if let Node::Element(e) = self {
            visit(e);
            for child in &e.children {
                child.walk(visit);
            }
        }
    }
}

/// Named containers of the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    SourceFilters,
    DealList,
    Pagination,
    AiResult,
    AiLoading,
    AiAnswer,
    AiSources,
    AiSourceList,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::SourceFilters,
        Region::DealList,
        Region::Pagination,
        Region::AiResult,
        Region::AiLoading,
        Region::AiAnswer,
        Region::AiSources,
        Region::AiSourceList,
    ];

    pub fn dom_id(self) -> &'static str {
        match self {
            Region::SourceFilters => "source-buttons",
            Region::DealList => "hotdeal-list",
            Region::Pagination => "pagination",
            Region::AiResult => "ai-result",
            Region::AiLoading => "ai-loading",
            Region::AiAnswer => "ai-answer",
            Region::AiSources => "ai-sources",
            Region::AiSourceList => "ai-source-list",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RegionState {
    pub visible: bool,
    pub nodes: Vec<Node>,
}

pub type Listener = Box<dyn Fn(&Action) + Send + Sync>;

/// Headless page model: regions of render trees plus click dispatch.
pub struct View {
    regions: BTreeMap<Region, RegionState>,
    prompt: Option<String>,
    listeners: Vec<Listener>,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("regions", &self.regions)
            .field("prompt", &self.prompt)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct ViewSnapshot<'a> {
    pub regions: &'a BTreeMap<Region, RegionState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<&'a str>,
}

impl View {
    /// The deal regions start visible, the AI result area starts hidden.
    pub fn new() -> Self {
        let regions = Region::ALL
            .iter()
            .map(|&region| {
                let visible = !matches!(region, Region::AiResult);
                (
                    region,
                    RegionState {
                        visible,
                        nodes: Vec::new(),
                    },
                )
            })
            .collect();
        Self {
            regions,
            prompt: None,
            listeners: Vec::new(),
        }
    }

    fn region_mut(&mut self, region: Region) -> &mut RegionState {
        self.regions.entry(region).or_default()
    }

    pub fn nodes(&self, region: Region) -> &[Node] {
        self.regions
            .get(&region)
            .map(|r| r.nodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn replace(&mut self, region: Region, nodes: Vec<Node>) {
        self.region_mut(region).nodes = nodes;
    }

    pub fn append(&mut self, region: Region, node: Node) {
        self.region_mut(region).nodes.push(node);
    }

    pub fn clear(&mut self, region: Region) {
        self.region_mut(region).nodes.clear();
    }

    pub fn show(&mut self, region: Region) {
        self.region_mut(region).visible = true;
    }

    pub fn hide(&mut self, region: Region) {
        self.region_mut(region).visible = false;
    }

    pub fn set_visible(&mut self, region: Region, visible: bool) {
        self.region_mut(region).visible = visible;
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.regions.get(&region).map(|r| r.visible).unwrap_or(false)
    }

    pub fn text(&self, region: Region) -> String {
        self.nodes(region).iter().map(Node::text_content).collect()
    }

    /// Elements in `region` carrying `class`, in document order.
    pub fn find_by_class(&self, region: Region, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        for node in self.nodes(region) {
            node.walk(&mut |e| {
                if e.has_class(class) {
                    found.push(e);
                }
            });
        }
        found
    }

    /// Shows a user-facing prompt, replacing any pending one.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.prompt = Some(message.into());
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn take_prompt(&mut self) -> Option<String> {
        self.prompt.take()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&Action) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn dispatch(&self, action: &Action) {
        for listener in &self.listeners {
            listener(action);
        }
    }

    /// Whether a visible control carries `action`. A region only counts as
    /// visible when its enclosing AI result area is shown too.
    pub fn has_control(&self, action: &Action) -> bool {
        self.regions
            .iter()
            .filter(|(region, _)| self.is_effectively_visible(**region))
            .any(|(_, state)| {
                let mut hit = false;
                for node in &state.nodes {
                    node.walk(&mut |e| {
                        if e.on_click.as_ref() == Some(action) {
                            hit = true;
                        }
                    });
                }
                hit
            })
    }

    fn is_effectively_visible(&self, region: Region) -> bool {
        let inside_ai = matches!(
            region,
            Region::AiLoading | Region::AiAnswer | Region::AiSources | Region::AiSourceList
        );
        self.is_visible(region) && (!inside_ai || self.is_visible(Region::AiResult))
    }

    /// Activates the control carrying `action`, notifying every listener.
    /// Returns false when no such control is currently on screen.
    pub fn click(&self, action: &Action) -> bool {
        if !self.has_control(action) {
            log::debug!("no visible control for {action:?}");
            return false;
        }
        self.dispatch(action);
        true
    }

    pub fn snapshot(&self) -> ViewSnapshot<'_> {
        ViewSnapshot {
            regions: &self.regions,
            prompt: self.prompt.as_deref(),
        }
    }
}
