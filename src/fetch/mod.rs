mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use serde_json::Value;
use tracing::debug;

use crate::config::Provider;
use crate::error::FetchError;

/// Issues a GET for `url` and returns the parsed JSON body unmodified.
///
/// Non-2xx statuses map to [`FetchError::Upstream`], transport failures to
/// [`FetchError::Network`]. No retries. The response is consumed (and its
/// connection released) on every path.
pub async fn fetch_json<C: HttpClient + ?Sized>(
    client: &C,
    provider: Provider,
    url: &str,
) -> Result<Value, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let mut req = reqwest::Request::new(reqwest::Method::GET, parsed);
    req.headers_mut().insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let resp = client
        .execute(req)
        .await
        .map_err(|source| FetchError::Network { provider, source })?;

    let status = resp.status();
    if !status.is_success() {
        debug!(%provider, status = status.as_u16(), "Upstream returned non-success status");
        return Err(FetchError::Upstream {
            provider,
            status: status.as_u16(),
        });
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|source| FetchError::Network { provider, source })?;

    serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
        provider,
        message: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-response clients shared by the crate's unit tests.

    use super::HttpClient;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// What a [`MockClient`] does for a URL whose path contains a key.
    #[derive(Clone)]
    pub enum Canned {
        Json(u16, String),
        TransportError,
    }

    /// Answers requests by matching a path fragment; unmatched requests get a
    /// transport error. Records every URL it sees.
    #[derive(Default)]
    pub struct MockClient {
        routes: Vec<(String, Canned)>,
        pub seen: Mutex<Vec<String>>,
    }

    impl MockClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, path_fragment: &str, canned: Canned) -> Self {
            self.routes.push((path_fragment.to_string(), canned));
            self
        }

        pub fn json(self, path_fragment: &str, body: serde_json::Value) -> Self {
            self.route(path_fragment, Canned::Json(200, body.to_string()))
        }

        pub fn status(self, path_fragment: &str, status: u16) -> Self {
            self.route(path_fragment, Canned::Json(status, "{}".to_string()))
        }

        pub fn seen_urls(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    /// A real `reqwest::Error`, obtained the only way a test can build one.
    pub fn transport_error() -> reqwest::Error {
        let resp: reqwest::Response = http::Response::builder()
            .status(500)
            .body("")
            .unwrap()
            .into();
        resp.error_for_status().unwrap_err()
    }

    #[async_trait]
    impl HttpClient for MockClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.seen.lock().unwrap().push(req.url().to_string());

            let canned = self
                .routes
                .iter()
                .find(|(frag, _)| req.url().path().contains(frag.as_str()))
                .map(|(_, c)| c.clone())
                .unwrap_or(Canned::TransportError);

            match canned {
                Canned::Json(status, body) => Ok(http::Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap()
                    .into()),
                Canned::TransportError => Err(transport_error()),
            }
        }
    }
}
