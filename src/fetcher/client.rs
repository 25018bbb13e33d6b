use crate::fetcher::{
    charset,
    errors::{BlockedRedirect, FetchError},
    types::PageResponse,
};
use crate::safety::check_local_rules;
use chrono::Utc;
use once_cell::sync::Lazy;
use reqwest::{
    Client, ClientBuilder, header,
    redirect::{Action, Attempt, Policy},
};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "AdevarBot/0.1 (+https://adevar.example.ro)";
const MAX_REDIRECTS: usize = 10;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("ro-RO,ro;q=0.9,en;q=0.5"),
    );

    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .redirect(Policy::custom(guard_redirect))
        .default_headers(headers)
        .build()
        .expect("Failed to build HTTP client")
});

/// Every hop gets the same scheme and host rules as the submitted URL, so a
/// public page cannot bounce the fetch onto an internal address.
fn guard_redirect(attempt: Attempt) -> Action {
    if attempt.previous().len() >= MAX_REDIRECTS {
        return attempt.error("too many redirects");
    }
    if check_local_rules(attempt.url().as_str()).is_err() {
        let target = attempt.url().to_string();
        return attempt.error(BlockedRedirect(target));
    }
    attempt.follow()
}

/// Process-wide HTTP client. Timeouts are set per request by its users.
pub fn shared_client() -> &'static Client {
    &HTTP_CLIENT
}

/// Downloads article pages with a bounded body size and a per-request timeout.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_body: u64,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: shared_client().clone(),
            timeout,
            max_body: MAX_BODY_SIZE,
        }
    }

    pub fn with_max_body(mut self, max_body: u64) -> Self {
        self.max_body = max_body;
        self
    }

    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        let parsed_url = Url::parse(url)?;

        let mut response = self
            .client
            .get(parsed_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        if let Some(content_length) = response.content_length()
            && content_length > self.max_body
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let url_final = response.url().clone();

        // Content-Length may be missing (chunked) or describe the compressed size
        let mut body_bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(FetchError::from_reqwest_error)?
        {
            let received = (body_bytes.len() + chunk.len()) as u64;
            if received > self.max_body {
                return Err(FetchError::BodyTooLarge(received));
            }
            body_bytes.extend_from_slice(&chunk);
        }

        let encoding = charset::detect(&content_type, &body_bytes);
        let body = charset::decode(&body_bytes, encoding);
        debug!(
            status = %status,
            encoding = encoding.name(),
            bytes = body_bytes.len(),
            "fetched page"
        );

        Ok(PageResponse {
            url_final,
            status,
            body,
            encoding: encoding.name(),
            fetched_at: Utc::now(),
        })
    }
}
