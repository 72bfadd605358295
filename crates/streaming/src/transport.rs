use std::cell::RefCell;
use std::collections::BTreeMap;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The fetch did not produce a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// HTTP status when a response arrived; `None` for network-level failures.
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => write!(f, "network error: {}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// "Fetch a resource, get bytes or a failure."
///
/// Implementations return `Ok` for any completed exchange, including non-2xx
/// statuses; interpreting the status is the loader's job. There are no
/// retries and no timeout beyond what the underlying client does.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// In-memory transport serving canned responses by exact URL.
///
/// Unknown URLs answer 404. Every call is counted.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: BTreeMap<String, Result<HttpResponse, TransportError>>,
    hits: RefCell<BTreeMap<String, usize>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: impl Into<String>, response: HttpResponse) -> Self {
        self.routes.insert(url.into(), Ok(response));
        self
    }

    pub fn with_failure(mut self, url: impl Into<String>, error: TransportError) -> Self {
        self.routes.insert(url.into(), Err(error));
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.borrow().get(url).copied().unwrap_or(0)
    }
}

impl Transport for MemoryTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        *self.hits.borrow_mut().entry(url.to_string()).or_default() += 1;
        match self.routes.get(url) {
            Some(route) => route.clone(),
            None => Ok(HttpResponse::new(404, Vec::new())),
        }
    }
}
