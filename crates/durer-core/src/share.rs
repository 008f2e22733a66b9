//! Share/load resolver: bridges an opaque share code to a saved snapshot
//! through the remote store.
//!
//! The remote store is a plain key-value surface:
//! `GET states/{id}` -> `{ timer_data: SavedState }` or 404,
//! `PUT states/{id}` -> stores/overwrites (last write wins, no conflict
//! detection). Shareable links embed the code as a `timer` query parameter.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::ShareError;
use crate::storage::SavedState;

/// Wire envelope the remote store wraps snapshots in.
#[derive(Debug, Serialize, Deserialize)]
struct StateEnvelope {
    timer_data: SavedState,
}

/// What a successful publish hands back to the user.
#[derive(Debug, Clone)]
pub struct Published {
    pub id: String,
    pub link: Url,
}

/// Client for the remote snapshot store.
#[derive(Debug, Clone)]
pub struct ShareClient {
    http: reqwest::Client,
    api_base: Url,
    link_base: Url,
}

impl ShareClient {
    pub fn new(api_base: Url, link_base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            link_base,
        }
    }

    /// Store `state` remotely under its own id, overwriting any previous
    /// snapshot there.
    pub async fn put_state(&self, state: &SavedState) -> Result<(), ShareError> {
        let url = self.state_url(&state.id)?;
        let response = self.http.put(url).json(state).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ShareError::Server { status });
        }
        Ok(())
    }

    /// Fetch the snapshot stored under `id`.
    ///
    /// `Ok(None)` means the code resolves to nothing (404) -- distinct from
    /// `Err`, which means the store itself misbehaved or was unreachable, so
    /// callers can show "invalid code" and "network error" differently.
    pub async fn resolve(&self, id: &str) -> Result<Option<SavedState>, ShareError> {
        let url = self.state_url(id)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ShareError::Server { status });
        }
        let envelope: StateEnvelope = response.json().await?;
        Ok(Some(envelope.timer_data))
    }

    /// Publish a snapshot for sharing and return the code plus link.
    ///
    /// With `desired_id` the code is used verbatim (trimmed); whatever was
    /// stored under it before is overwritten. Without, a fresh random code
    /// is generated. There is no local fallback -- a share that only exists
    /// on this machine is not a share.
    pub async fn publish(
        &self,
        snapshot: &SavedState,
        desired_id: Option<&str>,
    ) -> Result<Published, ShareError> {
        let id = match desired_id {
            Some(custom) => {
                let custom = custom.trim();
                if custom.is_empty() {
                    return Err(ShareError::EmptyId);
                }
                custom.to_string()
            }
            None => Uuid::new_v4().to_string(),
        };
        let mut shared = snapshot.clone();
        shared.id = id.clone();
        self.put_state(&shared).await?;
        let link = self.share_link(&id);
        Ok(Published { id, link })
    }

    /// Link embedding the share code as the `timer` query parameter.
    pub fn share_link(&self, id: &str) -> Url {
        let mut link = self.link_base.clone();
        link.query_pairs_mut().clear().append_pair("timer", id);
        link
    }

    /// Extract the share code from a deep link, if it carries one.
    pub fn parse_share_link(link: &str) -> Option<String> {
        let url = Url::parse(link).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "timer")
            .map(|(_, value)| value.into_owned())
    }

    fn state_url(&self, id: &str) -> Result<Url, ShareError> {
        Ok(self.api_base.join(&format!("states/{id}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AppSettings, SavedState};
    use crate::timer::TimerState;

    fn snapshot(id: &str, total_ms: i64) -> SavedState {
        SavedState {
            id: id.to_string(),
            name: "test".to_string(),
            saved_at: 1_700_000_000_000,
            timer_state: TimerState::new(total_ms, 1_700_000_000_000),
            app_settings: AppSettings::default(),
        }
    }

    fn client(server: &mockito::ServerGuard) -> ShareClient {
        ShareClient::new(
            Url::parse(&format!("{}/api/", server.url())).unwrap(),
            Url::parse("http://timer.example/").unwrap(),
        )
    }

    #[tokio::test]
    async fn resolve_unwraps_the_envelope() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "id": "abc",
            "name": "test",
            "timer_data": snapshot("abc", 60_000),
        });
        let _m = server
            .mock("GET", "/api/states/abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let state = client(&server).resolve("abc").await.unwrap().unwrap();
        assert_eq!(state.id, "abc");
        assert_eq!(state.timer_state.total_ms, 60_000);
    }

    #[tokio::test]
    async fn resolve_distinguishes_missing_from_faulty() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/api/states/nope")
            .with_status(404)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/api/states/boom")
            .with_status(500)
            .create_async()
            .await;

        let client = client(&server);
        assert!(client.resolve("nope").await.unwrap().is_none());
        match client.resolve("boom").await {
            Err(ShareError::Server { status }) => assert_eq!(status.as_u16(), 500),
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_with_custom_id_overwrites() {
        let mut server = mockito::Server::new_async().await;
        let put = server
            .mock("PUT", "/api/states/mycode")
            .with_status(200)
            .expect(2)
            .create_async()
            .await;
        // The store keeps only the last write; resolving afterwards returns
        // the second snapshot.
        let second = snapshot("mycode", 120_000);
        let _get = server
            .mock("GET", "/api/states/mycode")
            .with_status(200)
            .with_body(serde_json::json!({ "timer_data": second }).to_string())
            .create_async()
            .await;

        let client = client(&server);
        let first = client
            .publish(&snapshot("local", 60_000), Some("mycode"))
            .await
            .unwrap();
        assert_eq!(first.id, "mycode");
        client
            .publish(&snapshot("local", 120_000), Some(" mycode "))
            .await
            .unwrap();
        put.assert_async().await;

        let resolved = client.resolve("mycode").await.unwrap().unwrap();
        assert_eq!(resolved.timer_state.total_ms, 120_000);
    }

    #[tokio::test]
    async fn publish_rejects_blank_custom_ids() {
        let server = mockito::Server::new_async().await;
        let client = client(&server);
        assert!(matches!(
            client.publish(&snapshot("x", 1_000), Some("   ")).await,
            Err(ShareError::EmptyId)
        ));
    }

    #[tokio::test]
    async fn publish_generates_a_code_when_none_given() {
        let mut server = mockito::Server::new_async().await;
        let _put = server
            .mock("PUT", mockito::Matcher::Regex(r"^/api/states/[0-9a-f-]{36}$".into()))
            .with_status(200)
            .create_async()
            .await;

        let published = client(&server)
            .publish(&snapshot("local", 60_000), None)
            .await
            .unwrap();
        assert_eq!(published.id.len(), 36);
        assert_eq!(
            ShareClient::parse_share_link(published.link.as_str()).as_deref(),
            Some(published.id.as_str())
        );
    }

    #[test]
    fn share_links_round_trip_the_code() {
        let client = ShareClient::new(
            Url::parse("http://localhost:8000/api/").unwrap(),
            Url::parse("http://timer.example/").unwrap(),
        );
        let link = client.share_link("abc-123");
        assert_eq!(link.as_str(), "http://timer.example/?timer=abc-123");
        assert_eq!(
            ShareClient::parse_share_link(link.as_str()).as_deref(),
            Some("abc-123")
        );
        assert!(ShareClient::parse_share_link("http://timer.example/?other=1").is_none());
        assert!(ShareClient::parse_share_link("not a url").is_none());
    }
}
