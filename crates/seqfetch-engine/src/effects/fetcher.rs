use std::sync::Arc;

use tracing::trace;

use crate::core::{FilenameTemplate, StatusClass, classify_status, fragment_url};
use crate::data::{FetchOutcome, FragmentIndex};
use crate::effects::http::HttpClient;
use crate::effects::store::FragmentStore;
use crate::error::{FetchError, Result};

/// Fetches single fragments and persists the ones that exist.
///
/// One GET per call, no retries. 404 and empty 200 bodies are
/// [`FetchOutcome::Absent`]; any other non-200 status and every transport
/// failure is an error.
pub struct FragmentFetcher<C: HttpClient, S: FragmentStore> {
    client: Arc<C>,
    store: Arc<S>,
    base_url: String,
    template: FilenameTemplate,
    headers: Arc<[(String, String)]>,
}

impl<C: HttpClient, S: FragmentStore> FragmentFetcher<C, S> {
    pub fn new(
        client: Arc<C>,
        store: Arc<S>,
        base_url: impl Into<String>,
        template: FilenameTemplate,
        headers: Arc<[(String, String)]>,
    ) -> Self {
        Self {
            client,
            store,
            base_url: base_url.into(),
            template,
            headers,
        }
    }

    /// URL of the fragment at `index`.
    pub fn url_for(&self, index: FragmentIndex) -> String {
        fragment_url(&self.base_url, &self.template.render(index))
    }

    /// Fetch fragment `index`, storing its body if present.
    pub async fn fetch(&self, index: FragmentIndex) -> Result<FetchOutcome> {
        let url = self.url_for(index);
        let response = self
            .client
            .get(&url, &self.headers)
            .await
            .map_err(|e| FetchError::transport(&url, e))?;

        let outcome = match classify_status(response.status) {
            StatusClass::Missing => FetchOutcome::Absent,
            StatusClass::Unexpected => {
                return Err(FetchError::UnexpectedStatus {
                    status: response.status,
                    url,
                });
            }
            StatusClass::Found => {
                let outcome = FetchOutcome::from_len(response.body.len() as u64);
                if outcome.is_present() {
                    self.store.put(index, response.body).await?;
                }
                outcome
            }
        };

        trace!(index, %url, ?outcome, "fetched fragment");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::http::HttpResponse;
    use crate::effects::store::MemoryStore;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    /// Answers every request with a fixed status and body, or a transport error.
    struct Fixed(Option<(u16, &'static [u8])>);

    impl HttpClient for Fixed {
        type Error = Refused;

        async fn get(
            &self,
            _url: &str,
            _headers: &[(String, String)],
        ) -> std::result::Result<HttpResponse, Refused> {
            match self.0 {
                Some((status, body)) => Ok(HttpResponse::new(status, body)),
                None => Err(Refused),
            }
        }
    }

    type Fixture = (FragmentFetcher<Fixed, MemoryStore>, Arc<MemoryStore>);

    fn fetcher(reply: Option<(u16, &'static [u8])>) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let template = FilenameTemplate::parse("seg-%d.ts").unwrap();
        let fetcher = FragmentFetcher::new(
            Arc::new(Fixed(reply)),
            Arc::clone(&store),
            "http://cdn.example/live/",
            template,
            Arc::new([]),
        );
        (fetcher, store)
    }

    #[test]
    fn test_url_for() {
        let (fetcher, _) = fetcher(None);
        assert_eq!(fetcher.url_for(12), "http://cdn.example/live/seg-12.ts");
    }

    #[tokio::test]
    async fn test_present_is_stored() {
        let (fetcher, store) = fetcher(Some((200, b"payload")));
        assert_eq!(fetcher.fetch(4).await.unwrap(), FetchOutcome::Present(7));
        assert_eq!(store.get(4).unwrap().as_ref(), b"payload");
    }

    #[tokio::test]
    async fn test_not_found_is_absent() {
        let (fetcher, store) = fetcher(Some((404, b"")));
        assert_eq!(fetcher.fetch(0).await.unwrap(), FetchOutcome::Absent);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_is_absent_and_not_stored() {
        let (fetcher, store) = fetcher(Some((200, b"")));
        assert_eq!(fetcher.fetch(0).await.unwrap(), FetchOutcome::Absent);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_status_is_fatal() {
        let (fetcher, _) = fetcher(Some((503, b"busy")));
        let err = fetcher.fetch(9).await.unwrap_err();
        match err {
            FetchError::UnexpectedStatus { status, url } => {
                assert_eq!(status, 503);
                assert!(url.ends_with("seg-9.ts"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_fatal() {
        let (fetcher, _) = fetcher(None);
        let err = fetcher.fetch(1).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_second_fetch_of_same_index_is_rejected() {
        let (fetcher, _) = fetcher(Some((200, b"x")));
        fetcher.fetch(2).await.unwrap();
        let err = fetcher.fetch(2).await.unwrap_err();
        assert!(matches!(err, FetchError::DuplicateFragment(2)));
    }
}
