use std::fmt;
use std::io::Read;
use std::time::{Duration, Instant};
use url::Url;

const USER_AGENT: &str = "hardcopy/0.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_BYTES: usize = 16 * 1024 * 1024;

pub struct FetchResponse {
    pub url: String,           // final URL after redirects
    pub requested_url: String, // what we asked for
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub duration_ms: u128,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    InvalidUrl(String),
    UnsupportedScheme(String),
    Client(String),
    Transport(String),
    TooLarge { limit: usize },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidUrl(url) => write!(f, "not a valid absolute URL: {url}"),
            FetchError::UnsupportedScheme(scheme) => write!(f, "cannot fetch \"{scheme}:\" URLs"),
            FetchError::Client(e) => write!(f, "client build error: {e}"),
            FetchError::Transport(e) => write!(f, "request failed: {e}"),
            FetchError::TooLarge { limit } => write!(f, "response exceeds {limit} bytes"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Blocking fetch of a whole resource. Callers run it off the thread that owns the document.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;

    /// Status and headers only; the body is left unread and comes back empty.
    fn fetch_head(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.fetch(url)
    }
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_limits(DEFAULT_TIMEOUT, DEFAULT_MAX_BYTES)
    }

    pub fn with_limits(timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client, max_bytes })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl HttpFetcher {
    fn send(&self, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        self.client
            .get(parsed)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

fn response(
    url: &str,
    resp: &reqwest::blocking::Response,
    body: Vec<u8>,
    start: Instant,
) -> FetchResponse {
    FetchResponse {
        url: resp.url().to_string(),
        requested_url: url.to_string(),
        status: resp.status().as_u16(),
        content_type: resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        body,
        duration_ms: start.elapsed().as_millis(),
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();
        let resp = self.send(url)?;
        let head = response(url, &resp, Vec::new(), start);

        // one byte over the limit is enough to know it is too big
        let mut limited = resp.take(self.max_bytes as u64 + 1);
        let mut body = Vec::new();
        limited
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        if body.len() > self.max_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }

        Ok(FetchResponse {
            body,
            duration_ms: start.elapsed().as_millis(),
            ..head
        })
    }

    fn fetch_head(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();
        let resp = self.send(url)?;
        // dropping the response closes the connection without reading the body
        Ok(response(url, &resp, Vec::new(), start))
    }
}
