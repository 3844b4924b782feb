use std::future::Future;

use bytes::Bytes;

/// Status and body of a fragment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Only read for 200 responses; empty otherwise.
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Asynchronous HTTP client abstraction.
///
/// This trait provides the minimal interface needed to fetch one fragment.
/// Implementations follow redirects themselves and report any failure to
/// obtain a status line or body (DNS, refused connection, timeout, truncated
/// body) as `Err`. A non-200 status is not an error at this layer.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Scripted mocks in tests
pub trait HttpClient: Send + Sync {
    /// Error type for transport failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a GET for `url` with the given extra headers.
    ///
    /// The body is read to the end only when the status is 200.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = std::result::Result<HttpResponse, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use reqwest::{Client, Proxy, Url};

    use super::*;

    /// Settings used to build the underlying `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ClientSetting {
        /// Proxies to route through. `https` proxy URLs carry HTTPS traffic,
        /// everything else carries plain HTTP.
        pub proxies: Vec<Url>,

        /// Whole-request timeout. `None` keeps reqwest's default of no timeout.
        pub timeout: Option<Duration>,

        pub user_agent: Option<String>,
    }

    impl ClientSetting {
        #[must_use]
        pub fn proxy(mut self, url: Url) -> Self {
            self.proxies.push(url);
            self
        }

        #[must_use]
        pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
            self.timeout = timeout;
            self
        }

        #[must_use]
        pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
            self.user_agent = Some(user_agent.into());
            self
        }

        pub fn build(self) -> std::result::Result<Client, reqwest::Error> {
            let mut cb = Client::builder();

            let (secure, insecure): (Vec<Url>, Vec<Url>) =
                self.proxies.into_iter().partition(|u| u.scheme() == "https");

            for u in secure {
                cb = cb.proxy(Proxy::https(u)?);
            }

            for u in insecure {
                cb = cb.proxy(Proxy::http(u)?);
            }

            if let Some(timeout) = self.timeout {
                cb = cb.timeout(timeout);
            }

            if let Some(user_agent) = self.user_agent {
                cb = cb.user_agent(user_agent);
            }

            cb.build()
        }
    }

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: Client,
    }

    impl ReqwestClient {
        /// Create a client with default settings.
        pub fn new() -> std::result::Result<Self, reqwest::Error> {
            Self::with_setting(ClientSetting::default())
        }

        pub fn with_setting(setting: ClientSetting) -> std::result::Result<Self, reqwest::Error> {
            Ok(Self {
                client: setting.build()?,
            })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> std::result::Result<HttpResponse, Self::Error> {
            let mut request = self.client.get(url);

            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            if status != 200 {
                return Ok(HttpResponse::new(status, Bytes::new()));
            }

            let body = response.bytes().await?;
            Ok(HttpResponse::new(status, body))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientSetting, ReqwestClient};
#[cfg(feature = "reqwest")]
pub use reqwest::Url;
