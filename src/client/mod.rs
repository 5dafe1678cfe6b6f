use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{AiAnswer, DealPage, DealsPayload};

pub const DEALS_PATH: &str = "api/hotdeals";
pub const AI_SEARCH_PATH: &str = "api/search/ai";
pub const IMAGE_PROXY_PATH: &str = "image-proxy";
pub const DEFAULT_PER_PAGE: u32 = 20;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("unexpected response format: {message}")]
    Format { message: String },

    #[error("request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid backend URL: {url}")]
    InvalidUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealQuery {
    pub source: String,
    pub page: u32,
    pub per_page: u32,
}

impl DealQuery {
    pub fn new(source: &str, page: u32) -> Self {
        Self {
            source: source.to_string(),
            page,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }
}

/// URL builder for the three backend endpoints.
#[derive(Clone, Debug)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim();
        // `Url::join` drops the last path segment unless the base ends with '/'.
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        let base = Url::parse(&with_slash).map_err(|_| ClientError::InvalidUrl {
            url: trimmed.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: trimmed.to_string(),
            });
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Url {
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }

    pub fn deals(&self, query: &DealQuery) -> Url {
        let mut url = self.endpoint(DEALS_PATH);
        url.query_pairs_mut()
            .append_pair("source", &query.source)
            .append_pair("page", &query.page.to_string())
            .append_pair("per_page", &query.per_page.to_string());
        url
    }

    pub fn ai_search(&self, query: &str) -> Url {
        let mut url = self.endpoint(AI_SEARCH_PATH);
        url.query_pairs_mut().append_pair("query", query);
        url
    }

    pub fn image_proxy(&self, thumbnail: &str, source: &str) -> String {
        let mut url = self.endpoint(IMAGE_PROXY_PATH);
        url.query_pairs_mut()
            .append_pair("url", thumbnail)
            .append_pair("source", source);
        url.to_string()
    }
}

/// The backend calls the controllers depend on.
#[allow(async_fn_in_trait)]
pub trait HotdealApi {
    async fn fetch_deals(&self, query: &DealQuery) -> Result<DealPage, ClientError>;

    async fn ai_search(&self, query: &str) -> Result<AiAnswer, ClientError>;
}

pub fn parse_deals_body(body: &str) -> Result<DealPage, ClientError> {
    let payload: DealsPayload =
        decode(body, "expected a deal array or a {deals, pagination} object")?;
    Ok(payload.into_page())
}

pub fn parse_ai_body(body: &str) -> Result<AiAnswer, ClientError> {
    decode(body, "expected an {answer, sources} object")
}

fn decode<T: DeserializeOwned>(body: &str, expected: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Format {
        message: format!("{expected} ({e})"),
    })
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpClient {
    pub fn new(endpoints: Endpoints, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "hotdeals/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::ClientBuild { source: e })?;
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_text(&self, url: Url) -> Result<String, ClientError> {
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Transport { source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ClientError::Transport { source: e })
    }
}

impl HotdealApi for HttpClient {
    async fn fetch_deals(&self, query: &DealQuery) -> Result<DealPage, ClientError> {
        let body = self.get_text(self.endpoints.deals(query)).await?;
        parse_deals_body(&body)
    }

    async fn ai_search(&self, query: &str) -> Result<AiAnswer, ClientError> {
        let body = self.get_text(self.endpoints.ai_search(query)).await?;
        parse_ai_body(&body)
    }
}
