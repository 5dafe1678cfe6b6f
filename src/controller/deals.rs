use chrono::Local;
use serde::Serialize;

use crate::client::{DealQuery, Endpoints, HotdealApi, DEFAULT_PER_PAGE};
use crate::model::{SourceCatalog, ALL_SOURCES};
use crate::pagination;
use crate::view::widgets::{self, CardLayout};
use crate::view::{Action, Node, Region, View};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ControllerState {
    pub current_page: u32,
    pub current_source: String,
    pub total_pages: u32,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            current_page: 1,
            current_source: ALL_SOURCES.to_string(),
            total_pages: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered { count: usize },
    Empty,
    Failed { message: String },
}

/// Drives the deal list, its pagination bar and the source filters.
pub struct DealListController<A> {
    api: A,
    endpoints: Endpoints,
    sources: SourceCatalog,
    per_page: u32,
    layout: CardLayout,
    state: ControllerState,
}

impl<A: HotdealApi> DealListController<A> {
    pub fn new(api: A, endpoints: Endpoints, sources: SourceCatalog) -> Self {
        Self {
            api,
            endpoints,
            sources,
            per_page: DEFAULT_PER_PAGE,
            layout: CardLayout::Full,
            state: ControllerState::default(),
        }
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn layout(mut self, layout: CardLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn sources(&self) -> &SourceCatalog {
        &self.sources
    }

    /// Fetches one page of deals for `source` and re-renders the list and
    /// pagination regions. Failures are rendered, never returned.
    pub async fn load_deals(&mut self, view: &mut View, source: &str, page: u32) -> LoadOutcome {
        let page = page.max(1);
        self.state.current_source = source.to_string();
        self.state.current_page = page;

        view.replace(Region::DealList, vec![self.loading_placeholder(source, page)]);

        let query = DealQuery::new(source, page).per_page(self.per_page);
        log::debug!(
            "loading deals source={} page={} per_page={}",
            query.source,
            query.page,
            query.per_page
        );

        let result = match self.api.fetch_deals(&query).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("failed to load deals source={source} page={page}: {e}");
                let message = e.to_string();
                view.replace(Region::DealList, vec![widgets::error_panel(&message)]);
                view.clear(Region::Pagination);
                return LoadOutcome::Failed { message };
            }
        };

        let pagination = result.pagination;
        self.state.total_pages = pagination.total_pages;
        self.state.current_page = page.clamp(1, pagination.total_pages);

        if result.deals.is_empty() {
            view.replace(Region::DealList, vec![widgets::empty_state()]);
            view.clear(Region::Pagination);
            return LoadOutcome::Empty;
        }

        let now = Local::now();
        let cards = result
            .deals
            .iter()
            .map(|deal| widgets::deal_card(deal, &self.endpoints, now, self.layout))
            .collect::<Vec<_>>();
        let count = cards.len();
        view.replace(Region::DealList, cards);

        let controls = pagination::page_controls(self.state.current_page, pagination.total_pages);
        view.replace(Region::Pagination, widgets::pagination(&controls));

        log::info!(
            "rendered {count} deals source={} page={}/{}",
            self.state.current_source,
            self.state.current_page,
            self.state.total_pages
        );
        LoadOutcome::Rendered { count }
    }

    /// Loading panel naming the source by its display label.
    pub fn loading_placeholder(&self, source: &str, page: u32) -> Node {
        widgets::loading(&self.sources.label(source), page)
    }

    /// Renders the filter bar with `active` marked.
    pub fn render_filters(&self, view: &mut View, active: &str) {
        view.replace(
            Region::SourceFilters,
            widgets::source_filters(&self.sources.filters(), active),
        );
    }

    /// Switches the source filter exclusively to `source` and reloads from page 1.
    pub async fn select_source(&mut self, view: &mut View, source: &str) -> LoadOutcome {
        self.render_filters(view, source);
        self.load_deals(view, source, 1).await
    }

    /// Runs the deal-list side of an activated control. Returns `None` for
    /// actions this controller does not own.
    pub async fn handle(&mut self, view: &mut View, action: &Action) -> Option<LoadOutcome> {
        match action {
            Action::LoadPage(page) => {
                let source = self.state.current_source.clone();
                Some(self.load_deals(view, &source, *page).await)
            }
            Action::SelectSource(source) => Some(self.select_source(view, source).await),
            Action::ToggleSources => None,
        }
    }
}
