//! HTTP transport for remote template repositories
//!
//! A single GET/HEAD capability behind a trait so the resolver and
//! engine can be exercised without a network.

use std::time::Duration;
use thiserror::Error;

/// Connect/read timeout for every remote call. A timeout surfaces as a
/// transport failure, never a hang.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch-and-probe capability against a URL.
pub trait Transport {
    /// GET the URL and return the response body. Fails on any
    /// non-success status or I/O problem.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;

    /// HEAD the URL. Never fails; any error means "unreachable".
    fn probe(&self, url: &str) -> bool;
}

/// Errors raised by a remote fetch
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
}

/// Transport backed by a blocking ureq agent with a global timeout.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(HTTP_TIMEOUT))
            .build()
            .into();

        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let mut response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::StatusCode(status) => TransportError::Status {
                url: url.to_string(),
                status,
            },
            other => TransportError::Network {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;

        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn probe(&self, url: &str) -> bool {
        // Non-success statuses come back as Err from ureq
        self.agent.head(url).call().is_ok()
    }
}

#[cfg(test)]
pub mod testing {
    //! Scriptable transport for resolver and engine tests.

    use super::{Transport, TransportError};
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    /// In-memory transport: URLs map to canned bodies; everything else
    /// is unreachable. Counts fetches so tests can assert on how many
    /// network calls a resolution performed.
    #[derive(Default)]
    pub struct StubTransport {
        bodies: RefCell<BTreeMap<String, Vec<u8>>>,
        fetches: Cell<usize>,
        probes: Cell<usize>,
    }

    impl StubTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn serve(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
            self.bodies.borrow_mut().insert(url.into(), body.into());
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.get()
        }

        pub fn probe_count(&self) -> usize {
            self.probes.get()
        }
    }

    impl Transport for StubTransport {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
            self.fetches.set(self.fetches.get() + 1);
            self.bodies
                .borrow()
                .get(url)
                .cloned()
                .ok_or_else(|| TransportError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }

        fn probe(&self, url: &str) -> bool {
            self.probes.set(self.probes.get() + 1);
            self.bodies.borrow().contains_key(url)
        }
    }
}
