// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::config::FeedConfig;
use crate::decoder::{DecodeResult, UserListDecoder};
use crate::error::{FeedError, TransportError};

const WORKER_NAME: &str = "socialfeed-fetch";

/// Status and full body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Performs a single GET request.
///
/// Implementations return every received response, whatever its status, and
/// reserve `Err` for requests that produced no response at all.
pub trait HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url)
    }
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url)
    }
}

/// Fetches the user feed and hands the decoded result to a callback.
///
/// The coordinator keeps no state between calls: each request gets its own
/// response buffer and decode pass, and nothing is cached or retried.
pub struct FetchCoordinator<C> {
    client: Arc<C>,
    decoder: UserListDecoder,
}

impl<C> Clone for FetchCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            decoder: self.decoder,
        }
    }
}

impl<C: HttpClient> FetchCoordinator<C> {
    pub fn new(client: C) -> Self {
        Self::with_shared_client(Arc::new(client))
    }

    pub fn with_shared_client(client: Arc<C>) -> Self {
        Self {
            client,
            decoder: UserListDecoder::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetches and decodes on the calling thread.
    pub fn fetch_users(&self, endpoint: &str) -> DecodeResult {
        fetch_and_decode(&*self.client, &self.decoder, endpoint)
    }
}

impl<C: HttpClient + Send + Sync + 'static> FetchCoordinator<C> {
    /// Starts a fetch on a worker thread and returns immediately.
    ///
    /// `on_complete` runs exactly once on the worker, with either the decoded
    /// users or the failure. Joining the returned handle waits for the
    /// callback to finish.
    ///
    /// If the worker thread cannot be created the error is returned here and
    /// `on_complete` is dropped without being called.
    pub fn request_users<F>(
        &self,
        endpoint: impl Into<String>,
        on_complete: F,
    ) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce(DecodeResult) + Send + 'static,
    {
        let endpoint = endpoint.into();
        let client = Arc::clone(&self.client);
        let decoder = self.decoder;
        thread::Builder::new()
            .name(WORKER_NAME.to_owned())
            .spawn(move || {
                let result = fetch_and_decode(&*client, &decoder, &endpoint);
                on_complete(result);
            })
            .inspect_err(|err| warn!("could not start fetch worker: {err}"))
    }

    /// [`request_users`](Self::request_users) against the configured endpoint.
    pub fn request_configured<F>(
        &self,
        config: &FeedConfig,
        on_complete: F,
    ) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce(DecodeResult) + Send + 'static,
    {
        self.request_users(config.endpoint(), on_complete)
    }
}

#[cfg(feature = "ureq-client")]
impl FetchCoordinator<UreqClient> {
    /// Coordinator using a default [`UreqClient`].
    pub fn with_default_client() -> Self {
        Self::new(UreqClient::new())
    }
}

fn fetch_and_decode<C: HttpClient + ?Sized>(
    client: &C,
    decoder: &UserListDecoder,
    endpoint: &str,
) -> DecodeResult {
    let response = client.get(endpoint).map_err(|err| {
        warn!("request to {endpoint} failed: {err}");
        FeedError::TransportFailed(err)
    })?;
    if !response.is_success() {
        warn!("unexpected status {} from {endpoint}", response.status);
        return Err(FeedError::UnsuccessfulResponse {
            status: response.status,
        });
    }
    debug!("loaded {} bytes from {endpoint}", response.body.len());
    decoder.decode(&response.body)
}

#[cfg(feature = "ureq-client")]
pub use self::ureq_client::UreqClient;

#[cfg(feature = "ureq-client")]
mod ureq_client {
    use std::io::Read;

    use super::{HttpClient, HttpResponse};
    use crate::error::TransportError;

    /// Default limit on response body size.
    pub const DEFAULT_MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

    /// [`HttpClient`] backed by a blocking `ureq` agent.
    #[derive(Debug, Clone)]
    pub struct UreqClient {
        agent: ureq::Agent,
        max_body_bytes: u64,
    }

    impl Default for UreqClient {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqClient {
        pub fn new() -> Self {
            Self::with_agent(ureq::AgentBuilder::new().build())
        }

        /// Uses a preconfigured agent, for example one with timeouts set.
        pub fn with_agent(agent: ureq::Agent) -> Self {
            Self {
                agent,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            }
        }

        /// Bodies longer than `limit` fail with a [`TransportError`] instead
        /// of being decoded.
        pub fn max_body_bytes(mut self, limit: u64) -> Self {
            self.max_body_bytes = limit;
            self
        }

        fn read_body(&self, response: ureq::Response) -> Result<HttpResponse, TransportError> {
            let status = response.status();
            let mut body = Vec::new();
            // One byte past the limit is enough to tell an oversized body apart
            response
                .into_reader()
                .take(self.max_body_bytes.saturating_add(1))
                .read_to_end(&mut body)
                .map_err(|err| TransportError::with_source("failed to read response body", err))?;
            if body.len() as u64 > self.max_body_bytes {
                return Err(TransportError::new(format!(
                    "response body exceeds {} bytes",
                    self.max_body_bytes
                )));
            }
            Ok(HttpResponse { status, body })
        }
    }

    impl HttpClient for UreqClient {
        fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            match self.agent.get(url).set("Accept", "application/json").call() {
                Ok(response) => self.read_body(response),
                // Non-2xx statuses come back as errors from ureq; the body is
                // never decoded, so a failed read of it is not fatal.
                Err(ureq::Error::Status(status, response)) => {
                    Ok(self.read_body(response).unwrap_or(HttpResponse {
                        status,
                        body: Vec::new(),
                    }))
                }
                Err(ureq::Error::Transport(err)) => {
                    Err(TransportError::with_source("request failed", err))
                }
            }
        }
    }
}
