use crate::client::HotdealApi;
use crate::utils;
use crate::view::widgets;
use crate::view::{Region, View};

pub const EMPTY_QUERY_PROMPT: &str = "Please enter a search query.";
pub const FRIENDLY_FAILURE: &str =
    "Sorry, the AI search is unavailable right now. Please try again in a moment.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Rejected,
    Answered { sources: usize },
    Failed,
}

pub struct AiSearchController<A> {
    api: A,
}

impl<A: HotdealApi> AiSearchController<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn run_ai_search(&self, view: &mut View, raw_query: &str) -> SearchOutcome {
        let query = raw_query.trim();
        if query.is_empty() {
            view.alert(EMPTY_QUERY_PROMPT);
            return SearchOutcome::Rejected;
        }

        view.show(Region::AiResult);
        view.replace(Region::AiLoading, vec![widgets::ai_loading()]);
        view.show(Region::AiLoading);
        view.hide(Region::AiAnswer);
        view.hide(Region::AiSources);
        view.hide(Region::AiSourceList);

        log::debug!("ai search query={query:?}");
        let answer = self.api.ai_search(query).await;
        view.hide(Region::AiLoading);
        view.show(Region::AiAnswer);

        let answer = match answer {
            Ok(answer) => answer,
            Err(e) => {
                log::error!("ai search failed: {e}");
                view.replace(Region::AiAnswer, vec![widgets::ai_failure(FRIENDLY_FAILURE)]);
                view.clear(Region::AiSources);
                view.clear(Region::AiSourceList);
                return SearchOutcome::Failed;
            }
        };

        view.replace(
            Region::AiAnswer,
            vec![widgets::ai_answer(utils::format_answer(&answer.answer))],
        );

        let count = answer.sources.len();
        if count == 0 {
            view.clear(Region::AiSources);
            view.clear(Region::AiSourceList);
            view.hide(Region::AiSources);
            return SearchOutcome::Answered { sources: 0 };
        }

        view.replace(
            Region::AiSourceList,
            answer.sources.iter().map(widgets::ai_source_card).collect(),
        );
        view.replace(Region::AiSources, vec![widgets::ai_sources_header(count, true)]);
        view.show(Region::AiSourceList);
        view.show(Region::AiSources);

        SearchOutcome::Answered { sources: count }
    }
}

/// Collapses or expands the source list. Local view state only.
pub fn toggle_sources(view: &mut View) -> bool {
    let expanded = !view.is_visible(Region::AiSourceList);
    let count = view.nodes(Region::AiSourceList).len();
    view.set_visible(Region::AiSourceList, expanded);
    view.replace(
        Region::AiSources,
        vec![widgets::ai_sources_header(count, expanded)],
    );
    expanded
}
