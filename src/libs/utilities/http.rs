// The HTTP seam of the installer.
// Every network read (release lookup, archive download, checksum fetch) goes
// through `HttpFetcher`, so the pipeline can be exercised without a network.

use std::io::Read;
use std::time::Duration;

/// Sent with every request; the GitHub API rejects requests without one.
const USER_AGENT: &str = concat!("proton-ge-installer/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
// Generous, the archive is several hundred megabytes.
const READ_TIMEOUT: Duration = Duration::from_secs(120);

/// Why a GET did not produce a body.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("bad status {code} {reason} from {url}")]
    Status { url: String, code: u16, reason: String },

    /// DNS, connect, TLS or protocol failure.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
}

/// Issues a blocking GET and hands back the response body as a stream.
pub trait HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError>;
}

/// Production fetcher backed by a shared `ureq` agent.
pub struct UreqFetcher {
    agent: ureq::Agent,
}

impl UreqFetcher {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .build();
        UreqFetcher { agent }
    }
}

impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher for UreqFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
        match self.agent.get(url).set("User-Agent", USER_AGENT).call() {
            Ok(response) => {
                let body: Box<dyn Read + Send> = response.into_reader();
                Ok(body)
            }
            // ureq reports 4xx/5xx as errors; keep the code so callers can tell a
            // missing release apart from a broken connection.
            Err(ureq::Error::Status(code, response)) => Err(FetchError::Status {
                url: url.to_string(),
                code,
                reason: response.status_text().to_string(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(FetchError::Transport {
                url: url.to_string(),
                reason: transport.to_string(),
            }),
        }
    }
}

/// In-memory fetcher for tests: fixed routes, every request recorded.
#[cfg(test)]
pub mod fake {
    use super::{FetchError, HttpFetcher};
    use std::collections::HashMap;
    use std::io::{Cursor, Read};
    use std::sync::Mutex;

    enum Route {
        Body(Vec<u8>),
        Status(u16),
    }

    #[derive(Default)]
    pub struct FakeFetcher {
        routes: HashMap<String, Route>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.routes.insert(url.to_string(), Route::Body(body.into()));
            self
        }

        pub fn with_status(mut self, url: &str, code: u16) -> Self {
            self.routes.insert(url.to_string(), Route::Status(code));
            self
        }

        /// URLs requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    impl HttpFetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(url.to_string());
            }
            match self.routes.get(url) {
                Some(Route::Body(body)) => Ok(Box::new(Cursor::new(body.clone()))),
                Some(Route::Status(code)) => Err(FetchError::Status {
                    url: url.to_string(),
                    code: *code,
                    reason: "Fake".to_string(),
                }),
                None => Err(FetchError::Transport {
                    url: url.to_string(),
                    reason: "no route".to_string(),
                }),
            }
        }
    }
}
