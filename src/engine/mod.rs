use crate::replay::constants::{ENGINE_POLL_MS, FRAMES_PAGE_LIMIT};
use crate::replay::types::{GameMeta, RawSnapshot};
use anyhow::{anyhow, bail, Context};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// What an engine stream hands the viewer, in delivery order.
#[derive(Debug, Clone)]
pub enum EngineUpdate {
    /// One turn, tagged with the game metadata read after it was fetched.
    Frame(GameMeta, RawSnapshot),
    /// The status the game settled on once no more turns are coming.
    Status(GameMeta),
}

pub type FrameSender = mpsc::Sender<EngineUpdate>;

/// The simulation engine as seen by the viewer: an ordered source of turns
/// and a way to kick a stopped game.
pub trait Engine: Send + Sync + 'static {
    /// Sends every turn of the game in order, then the final status, and
    /// returns once the game has no more turns to give. A dropped receiver
    /// ends the stream early.
    fn stream_all_frames(
        &self,
        game_id: &str,
        frames: FrameSender,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn start_game(&self, game_id: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Clone)]
pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
}

impl EngineClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            poll_interval: Duration::from_millis(ENGINE_POLL_MS),
        }
    }

    pub async fn get_game(&self, game_id: &str) -> anyhow::Result<GameMeta> {
        self.request_json(Method::GET, &format!("/games/{game_id}"), None)
            .await
            .with_context(|| format!("failed to get game {game_id}"))
    }

    pub async fn get_frames(
        &self,
        game_id: &str,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<Vec<RawSnapshot>> {
        let query = vec![("offset", offset.to_string()), ("limit", limit.to_string())];
        let response: FramesResponse = self
            .request_json(Method::GET, &format!("/games/{game_id}/frames"), Some(&query))
            .await
            .with_context(|| format!("failed to get frames {offset}.. of game {game_id}"))?;
        Ok(response.frames)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Vec<(&str, String)>>,
    ) -> anyhow::Result<T> {
        let url = self.url(path);
        let mut request = self.http.request(method, &url);
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("engine request failed for {url}"))?;
        decode_response(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Engine for EngineClient {
    async fn stream_all_frames(&self, game_id: &str, frames: FrameSender) -> anyhow::Result<()> {
        let mut offset = 0usize;
        loop {
            // Status is read after the page so it is never older than the turns it tags.
            let page = self.get_frames(game_id, offset, FRAMES_PAGE_LIMIT).await?;
            let meta = self.get_game(game_id).await?;
            let received = page.len();
            tracing::debug!(game_id, offset, received, status = %meta.game.status, "fetched frames");

            for frame in page {
                if frames.send(EngineUpdate::Frame(meta.clone(), frame)).await.is_err() {
                    tracing::debug!(game_id, "frame receiver dropped, ending stream");
                    return Ok(());
                }
            }
            offset += received;

            if received >= FRAMES_PAGE_LIMIT {
                continue;
            }
            if !meta.is_running() {
                // The last turn may have been fetched while the game still ran.
                if frames.send(EngineUpdate::Status(meta)).await.is_err() {
                    tracing::debug!(game_id, "frame receiver dropped, ending stream");
                    return Ok(());
                }
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        tracing::info!(game_id, frames = offset, "frame stream finished");
        Ok(())
    }

    async fn start_game(&self, game_id: &str) -> anyhow::Result<()> {
        let url = self.url(&format!("/games/{game_id}/start"));
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .with_context(|| format!("engine request failed for {url}"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("engine refused to start game {game_id} ({}): {body}", status.as_u16());
        }
        tracing::info!(game_id, "game start requested");
        Ok(())
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("engine error {}: {}", status.as_u16(), body);
    }
    response
        .json::<T>()
        .await
        .map_err(|error| anyhow!("failed to decode engine response: {error}"))
}

#[derive(Debug, Deserialize)]
struct FramesResponse {
    #[serde(rename = "Frames", default)]
    frames: Vec<RawSnapshot>,
}
