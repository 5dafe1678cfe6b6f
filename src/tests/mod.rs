use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::app::{parse_command, Command, Session};
use crate::client::{parse_deals_body, ClientError, DealQuery, Endpoints, HotdealApi, HttpClient};
use crate::controller::{
    toggle_sources, AiSearchController, DealListController, LoadOutcome, SearchOutcome,
};
use crate::model::{AiAnswer, AiSource, Deal, DealPage, SourceCatalog};
use crate::view::widgets::{ICON_COLLAPSED, ICON_EXPANDED};
use crate::view::{Action, Node, Region, View};

#[derive(Clone, Default)]
struct FakeApi {
    deal_queries: Arc<Mutex<Vec<DealQuery>>>,
    ai_queries: Arc<Mutex<Vec<String>>>,
    deal_bodies: Arc<Mutex<VecDeque<Result<String, u16>>>>,
    ai_bodies: Arc<Mutex<VecDeque<Result<String, u16>>>>,
}

impl FakeApi {
    fn with_deals(self, body: &str) -> Self {
        self.deal_bodies.lock().unwrap().push_back(Ok(body.to_string()));
        self
    }

    fn with_deal_status(self, status: u16) -> Self {
        self.deal_bodies.lock().unwrap().push_back(Err(status));
        self
    }

    fn with_answer(self, body: &str) -> Self {
        self.ai_bodies.lock().unwrap().push_back(Ok(body.to_string()));
        self
    }

    fn with_answer_status(self, status: u16) -> Self {
        self.ai_bodies.lock().unwrap().push_back(Err(status));
        self
    }

    fn deal_queries(&self) -> Vec<DealQuery> {
        self.deal_queries.lock().unwrap().clone()
    }

    fn ai_queries(&self) -> Vec<String> {
        self.ai_queries.lock().unwrap().clone()
    }
}

impl HotdealApi for FakeApi {
    async fn fetch_deals(&self, query: &DealQuery) -> Result<DealPage, ClientError> {
        self.deal_queries.lock().unwrap().push(query.clone());
        let next = self.deal_bodies.lock().unwrap().pop_front();
        match next {
            Some(Ok(body)) => parse_deals_body(&body),
            Some(Err(status)) => Err(ClientError::Http { status }),
            None => parse_deals_body("[]"),
        }
    }

    async fn ai_search(&self, query: &str) -> Result<AiAnswer, ClientError> {
        self.ai_queries.lock().unwrap().push(query.to_string());
        let next = self.ai_bodies.lock().unwrap().pop_front();
        match next {
            Some(Ok(body)) => crate::client::parse_ai_body(&body),
            Some(Err(status)) => Err(ClientError::Http { status }),
            None => Err(ClientError::Http { status: 503 }),
        }
    }
}

fn endpoints() -> Endpoints {
    Endpoints::new("http://deals.test/").unwrap()
}

fn controller(api: &FakeApi) -> DealListController<FakeApi> {
    DealListController::new(api.clone(), endpoints(), SourceCatalog::default())
}

fn deals_json(count: usize) -> String {
    let deals = (0..count)
        .map(|i| {
            serde_json::json!({
                "title": format!("Deal {i}"),
                "link": format!("https://shop.test/{i}"),
                "source": "ppomppu",
                "author": "kim",
                "price": "10,000 KRW",
            })
        })
        .collect::<Vec<_>>();
    serde_json::Value::Array(deals).to_string()
}

fn paged_json(count: usize, page: u32, total_pages: u32) -> String {
    serde_json::json!({
        "deals": serde_json::from_str::<serde_json::Value>(&deals_json(count)).unwrap(),
        "pagination": {
            "page": page,
            "per_page": 20,
            "total": (total_pages as u64) * 20,
            "total_pages": total_pages,
        }
    })
    .to_string()
}

fn page_labels(view: &View) -> Vec<String> {
    view.find_by_class(Region::Pagination, "page-btn")
        .iter()
        .map(|e| Node::Element((*e).clone()).text_content())
        .collect()
}

#[tokio::test]
async fn load_issues_one_request_and_tracks_state() {
    let api = FakeApi::default().with_deals(&paged_json(3, 2, 5));
    let mut deals = controller(&api);
    let mut view = View::new();

    let outcome = deals.load_deals(&mut view, "ruliweb", 2).await;

    assert_eq!(outcome, LoadOutcome::Rendered { count: 3 });
    let queries = api.deal_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].source, "ruliweb");
    assert_eq!(queries[0].page, 2);
    assert_eq!(queries[0].per_page, 20);
    assert_eq!(deals.state().current_source, "ruliweb");
    assert_eq!(deals.state().current_page, 2);
    assert_eq!(deals.state().total_pages, 5);
    assert_eq!(view.find_by_class(Region::DealList, "deal-card").len(), 3);
}

#[tokio::test]
async fn bare_array_renders_without_pagination() {
    let api = FakeApi::default().with_deals(&deals_json(4));
    let mut deals = controller(&api);
    let mut view = View::new();

    let outcome = deals.load_deals(&mut view, "all", 1).await;

    assert_eq!(outcome, LoadOutcome::Rendered { count: 4 });
    assert_eq!(deals.state().total_pages, 1);
    assert!(view.nodes(Region::Pagination).is_empty());
}

#[tokio::test]
async fn middle_page_of_three_renders_full_bar() {
    let api = FakeApi::default().with_deals(&paged_json(2, 2, 3));
    let mut deals = controller(&api);
    let mut view = View::new();

    deals.load_deals(&mut view, "all", 2).await;

    assert_eq!(page_labels(&view), vec!["Previous", "1", "2", "3", "Next"]);
    let active = view.find_by_class(Region::Pagination, "active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].get_attr("data-page"), Some("2"));
    assert!(view.find_by_class(Region::Pagination, "page-gap").is_empty());
}

#[tokio::test]
async fn empty_list_shows_empty_state_and_clears_pagination() {
    let api = FakeApi::default()
        .with_deals(&paged_json(2, 1, 4))
        .with_deals(&paged_json(0, 1, 1));
    let mut deals = controller(&api);
    let mut view = View::new();

    deals.load_deals(&mut view, "all", 1).await;
    assert!(!view.nodes(Region::Pagination).is_empty());

    let outcome = deals.load_deals(&mut view, "zod", 1).await;

    assert_eq!(outcome, LoadOutcome::Empty);
    assert_eq!(view.find_by_class(Region::DealList, "empty-state").len(), 1);
    assert!(view.find_by_class(Region::DealList, "deal-card").is_empty());
    assert!(view.nodes(Region::Pagination).is_empty());
}

#[tokio::test]
async fn malformed_body_renders_error_panel() {
    let api = FakeApi::default().with_deals(r#"{"items": 3}"#);
    let mut deals = controller(&api);
    let mut view = View::new();

    let outcome = deals.load_deals(&mut view, "all", 1).await;

    assert!(matches!(outcome, LoadOutcome::Failed { .. }));
    let panels = view.find_by_class(Region::DealList, "error-panel");
    assert_eq!(panels.len(), 1);
    assert!(view.text(Region::DealList).contains("unexpected response format"));
}

#[tokio::test]
async fn http_error_status_is_shown_and_pagination_cleared() {
    let api = FakeApi::default()
        .with_deals(&paged_json(2, 1, 3))
        .with_deal_status(500);
    let mut deals = controller(&api);
    let mut view = View::new();

    deals.load_deals(&mut view, "all", 1).await;
    let outcome = deals.load_deals(&mut view, "all", 2).await;

    assert_eq!(
        outcome,
        LoadOutcome::Failed {
            message: "HTTP error! status: 500".to_string()
        }
    );
    assert_eq!(
        view.text(Region::DealList),
        "Failed to load data: HTTP error! status: 500"
    );
    assert!(view.nodes(Region::Pagination).is_empty());
}

#[tokio::test]
async fn selecting_a_source_marks_one_button_and_resets_page() {
    let api = FakeApi::default()
        .with_deals(&paged_json(2, 3, 5))
        .with_deals(&paged_json(2, 1, 2));
    let mut deals = controller(&api);
    let mut view = View::new();

    deals.render_filters(&mut view, "all");
    deals.load_deals(&mut view, "all", 3).await;
    deals.select_source(&mut view, "zod").await;

    let active = view.find_by_class(Region::SourceFilters, "active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].get_attr("data-source"), Some("zod"));
    assert_eq!(deals.state().current_page, 1);
    assert_eq!(deals.state().current_source, "zod");
    assert_eq!(api.deal_queries()[1].page, 1);
}

#[tokio::test]
async fn empty_ai_query_makes_no_request() {
    let api = FakeApi::default();
    let search = AiSearchController::new(api.clone());
    let mut view = View::new();

    let outcome = search.run_ai_search(&mut view, "   ").await;

    assert_eq!(outcome, SearchOutcome::Rejected);
    assert!(api.ai_queries().is_empty());
    assert_eq!(
        view.prompt(),
        Some(crate::controller::search::EMPTY_QUERY_PROMPT)
    );
    assert!(!view.is_visible(Region::AiResult));
}

#[tokio::test]
async fn answer_without_sources_hides_source_section() {
    let api =
        FakeApi::default().with_answer(r#"{"answer": "**Buy** now\n* cheap", "sources": []}"#);
    let search = AiSearchController::new(api.clone());
    let mut view = View::new();

    let outcome = search.run_ai_search(&mut view, "  ssd  ").await;

    assert_eq!(outcome, SearchOutcome::Answered { sources: 0 });
    assert_eq!(api.ai_queries(), vec!["ssd".to_string()]);
    assert!(view.is_visible(Region::AiResult));
    assert!(!view.is_visible(Region::AiLoading));
    assert!(!view.is_visible(Region::AiSources));
    match view.nodes(Region::AiAnswer)[0].as_element().unwrap().children[0] {
        Node::Markup(ref markup) => {
            assert_eq!(markup, "<strong>Buy</strong> now<br>• cheap")
        }
        ref other => panic!("expected markup, got {other:?}"),
    }
}

#[tokio::test]
async fn null_sources_still_count_as_an_answer() {
    let api = FakeApi::default().with_answer(r#"{"answer": "hello", "sources": null}"#);
    let search = AiSearchController::new(api);
    let mut view = View::new();

    let outcome = search.run_ai_search(&mut view, "ssd").await;

    assert_eq!(outcome, SearchOutcome::Answered { sources: 0 });
    assert_eq!(view.text(Region::AiAnswer), "hello");
    assert!(!view.is_visible(Region::AiSources));
}

#[tokio::test]
async fn failed_search_drops_previous_sources() {
    let api = FakeApi::default()
        .with_answer(r#"{"answer": "ok", "sources": [{"title": "Old", "link": "https://old.test"}]}"#)
        .with_answer_status(500);
    let search = AiSearchController::new(api);
    let mut view = View::new();

    search.run_ai_search(&mut view, "first").await;
    assert!(view.is_visible(Region::AiSourceList));

    let outcome = search.run_ai_search(&mut view, "second").await;

    assert_eq!(outcome, SearchOutcome::Failed);
    assert!(view.find_by_class(Region::AiSourceList, "ai-source-card").is_empty());
    assert!(view.nodes(Region::AiSources).is_empty());
    assert!(!view.is_visible(Region::AiSourceList));
    assert_eq!(
        view.text(Region::AiAnswer),
        crate::controller::search::FRIENDLY_FAILURE
    );
}

#[tokio::test]
async fn ai_failure_shows_friendly_message() {
    let api = FakeApi::default().with_answer_status(502);
    let search = AiSearchController::new(api.clone());
    let mut view = View::new();

    let outcome = search.run_ai_search(&mut view, "monitor").await;

    assert_eq!(outcome, SearchOutcome::Failed);
    assert_eq!(
        view.text(Region::AiAnswer),
        crate::controller::search::FRIENDLY_FAILURE
    );
    assert!(view.nodes(Region::AiSourceList).is_empty());
}

#[tokio::test]
async fn toggle_flips_source_list_and_icon() {
    let api = FakeApi::default().with_answer(
        r#"{"answer": "ok", "sources": [
            {"title": "A", "link": "https://a.test"},
            {"title": "B", "link": "https://b.test"}
        ]}"#,
    );
    let search = AiSearchController::new(api);
    let mut view = View::new();

    search.run_ai_search(&mut view, "keyboard").await;
    assert!(view.is_visible(Region::AiSourceList));
    assert_eq!(view.find_by_class(Region::AiSourceList, "ai-source-card").len(), 2);
    assert!(view.text(Region::AiSources).contains("Sources (2)"));
    assert!(view.text(Region::AiSources).contains(ICON_EXPANDED));

    assert!(!toggle_sources(&mut view));
    assert!(!view.is_visible(Region::AiSourceList));
    assert!(view.text(Region::AiSources).contains(ICON_COLLAPSED));

    assert!(toggle_sources(&mut view));
    assert!(view.is_visible(Region::AiSourceList));
}

#[tokio::test]
async fn session_clicks_route_through_view_listener() {
    let api = FakeApi::default()
        .with_deals(&paged_json(2, 1, 3))
        .with_deals(&paged_json(2, 2, 3));
    let deals = controller(&api);
    let search = AiSearchController::new(api.clone());
    let mut session = Session::new(deals, search);

    session.start("all", 1).await;
    assert!(session.execute(Command::Next).await);

    assert_eq!(session.deals.state().current_page, 2);
    let queries = api.deal_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].page, 2);
}

#[tokio::test]
async fn session_ignores_pages_without_a_control() {
    let api = FakeApi::default().with_deals(&deals_json(3));
    let deals = controller(&api);
    let search = AiSearchController::new(api.clone());
    let mut session = Session::new(deals, search);

    session.start("all", 1).await;
    assert!(session.execute(parse_command("2")).await);

    assert_eq!(api.deal_queries().len(), 1);
    assert!(session.view.prompt().is_some());
    assert!(!session.view.click(&Action::LoadPage(2)));
}

#[tokio::test]
async fn session_toggle_uses_header_control() {
    let api = FakeApi::default()
        .with_deals(&deals_json(1))
        .with_answer(r#"{"answer": "ok", "sources": [{"title": "A", "link": "https://a.test"}]}"#);
    let deals = controller(&api);
    let search = AiSearchController::new(api.clone());
    let mut session = Session::new(deals, search);

    session.start("all", 1).await;
    session.execute(Command::Ask("mouse".to_string())).await;
    session.execute(Command::Toggle).await;

    assert!(!session.view.is_visible(Region::AiSourceList));
    assert!(!session.execute(Command::Quit).await);
}

#[test]
fn loading_placeholder_uses_source_labels() {
    let deals = controller(&FakeApi::default());

    let all = deals.loading_placeholder("all", 1).text_content();
    assert!(all.contains("(All, page 1)"));
    let ruliweb = deals.loading_placeholder("ruliweb", 3).text_content();
    assert!(ruliweb.contains("(Ruliweb, page 3)"));
    let unknown = deals.loading_placeholder("quasarzone", 2).text_content();
    assert!(unknown.contains("(quasarzone, page 2)"));
}

#[tokio::test]
async fn next_on_the_last_possible_page_does_not_overflow() {
    let api = FakeApi::default().with_deals(&paged_json(1, u32::MAX, u32::MAX));
    let deals = controller(&api);
    let search = AiSearchController::new(api.clone());
    let mut session = Session::new(deals, search);

    session.start("all", u32::MAX).await;
    assert_eq!(session.deals.state().current_page, u32::MAX);
    assert!(session.execute(Command::Next).await);

    assert_eq!(api.deal_queries().len(), 1);
    assert_eq!(session.view.prompt(), Some("there is no next page"));
}

#[test]
fn bare_array_body_is_single_page() {
    let page = parse_deals_body(&deals_json(2)).unwrap();
    assert_eq!(page.deals.len(), 2);
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.total_pages, 1);
}

#[test]
fn paged_body_normalizes_zero_total_pages() {
    let body = r#"{"deals": [], "pagination": {"page": 1, "per_page": 20, "total": 0, "total_pages": 0}}"#;
    let page = parse_deals_body(body).unwrap();
    assert!(page.deals.is_empty());
    assert_eq!(page.pagination.total_pages, 1);
}

#[test]
fn deal_missing_optional_fields_still_parses() {
    let page = parse_deals_body(r#"[{"title": "t", "link": "https://l.test"}]"#).unwrap();
    let deal: &Deal = &page.deals[0];
    assert_eq!(deal.price(), None);
    assert_eq!(deal.created_at, None);
}

#[test]
fn ai_source_defaults_to_empty() {
    let answer = crate::client::parse_ai_body(r#"{"answer": "hi"}"#).unwrap();
    assert_eq!(answer.sources, Vec::<AiSource>::new());
}

#[test]
fn ai_null_sources_parse_as_empty() {
    let answer = crate::client::parse_ai_body(r#"{"answer": "hi", "sources": null}"#).unwrap();
    assert!(answer.sources.is_empty());
}

async fn serve_once(
    status: &'static str,
    body: String,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let request = String::from_utf8_lossy(&request).to_string();
        request.lines().next().unwrap_or_default().to_string()
    });
    (format!("http://{addr}/"), handle)
}

#[tokio::test]
async fn http_client_sends_deal_query_params() {
    let (base, handle) = serve_once("200 OK", paged_json(1, 2, 4)).await;
    let client = HttpClient::new(Endpoints::new(&base).unwrap(), None).unwrap();

    let page = client
        .fetch_deals(&DealQuery::new("ppomppu", 2).per_page(10))
        .await
        .unwrap();

    assert_eq!(page.deals.len(), 1);
    assert_eq!(page.pagination.total_pages, 4);
    let request_line = handle.await.unwrap();
    assert_eq!(
        request_line,
        "GET /api/hotdeals?source=ppomppu&page=2&per_page=10 HTTP/1.1"
    );
}

#[tokio::test]
async fn http_client_maps_error_status() {
    let (base, handle) = serve_once("500 Internal Server Error", "{}".to_string()).await;
    let client = HttpClient::new(Endpoints::new(&base).unwrap(), None).unwrap();

    let err = client
        .fetch_deals(&DealQuery::new("all", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Http { status: 500 }));
    handle.await.unwrap();
}

#[tokio::test]
async fn http_client_encodes_ai_query() {
    let body = r#"{"answer": "yes", "sources": []}"#.to_string();
    let (base, handle) = serve_once("200 OK", body).await;
    let client = HttpClient::new(Endpoints::new(&base).unwrap(), None).unwrap();

    let answer = client.ai_search("ssd & nvme").await.unwrap();

    assert_eq!(answer.answer, "yes");
    let request_line = handle.await.unwrap();
    assert_eq!(request_line, "GET /api/search/ai?query=ssd+%26+nvme HTTP/1.1");
}

#[test]
fn endpoints_keep_base_path_prefix() {
    let endpoints = Endpoints::new("http://host.test/deals").unwrap();
    assert_eq!(
        endpoints.deals(&DealQuery::new("all", 1)).as_str(),
        "http://host.test/deals/api/hotdeals?source=all&page=1&per_page=20"
    );
    assert!(Endpoints::new("not a url").is_err());
}
