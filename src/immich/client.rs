use std::collections::HashSet;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use url::Url;

use super::error::ImmichError;
use super::models::{AlbumResponse, Asset, BulkIdResult, SearchResponse};
use super::session::ApiSession;

/// Immich REST client covering the three endpoints the album sync needs.
pub struct ImmichClient {
    base_url: Url,
    session: Box<dyn ApiSession>,
}

impl std::fmt::Debug for ImmichClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImmichClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ImmichClient {
    pub fn new(base_url: Url, session: Box<dyn ApiSession>) -> Self {
        Self { base_url, session }
    }

    /// Join path segments onto the base URL. Each segment is percent-encoded,
    /// and a trailing slash or a path prefix on the base is preserved.
    fn endpoint(&self, segments: &[&str]) -> Result<String, ImmichError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ImmichError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Run a metadata search and follow `nextPage` cursors until the last
    /// page, returning every asset in server order.
    pub async fn search_assets_by_metadata(
        &self,
        params: &Map<String, Value>,
    ) -> Result<Vec<Asset>, ImmichError> {
        let url = self.endpoint(&["api", "search", "metadata"])?;
        let mut assets = Vec::new();
        let mut body = params.clone();
        let mut followed: HashSet<String> = HashSet::new();

        loop {
            let response = self.session.post_json(&url, &Value::Object(body.clone())).await?;
            let response: SearchResponse =
                serde_json::from_value(response).map_err(|e| ImmichError::decode(&url, e))?;
            let page = response.assets;

            let requested = body.get("page").cloned().unwrap_or_default();
            debug!(
                items = page.items.len(),
                page = %requested,
                "Search page received"
            );

            let cursor = page.cursor().cloned();
            assets.extend(page.items);

            let Some(cursor) = cursor else {
                break;
            };
            if !followed.insert(cursor.to_string()) {
                return Err(ImmichError::UnexpectedResponse {
                    endpoint: url,
                    reason: format!("nextPage cursor {cursor} was already followed"),
                });
            }
            body.insert("page".to_string(), cursor);
        }

        Ok(assets)
    }

    /// Fetch the current members of an album.
    pub async fn get_album_assets(&self, album_id: &str) -> Result<Vec<Asset>, ImmichError> {
        let url = self.endpoint(&["api", "albums", album_id])?;
        let response = self.session.get_json(&url).await?;
        let album: AlbumResponse =
            serde_json::from_value(response).map_err(|e| ImmichError::decode(&url, e))?;
        Ok(album.assets)
    }

    /// Add assets to an album in one bulk request.
    ///
    /// Returns `Ok(false)` when the server rejected at least one id, for
    /// example because it was already a member or access was denied. Every
    /// submitted id must be acknowledged with `success: true` for `Ok(true)`.
    pub async fn add_assets_to_album(
        &self,
        album_id: &str,
        asset_ids: &[String],
    ) -> Result<bool, ImmichError> {
        let url = self.endpoint(&["api", "albums", album_id, "assets"])?;
        let response = self
            .session
            .put_json(&url, &json!({ "ids": asset_ids }))
            .await?;
        let results: Vec<BulkIdResult> =
            serde_json::from_value(response).map_err(|e| ImmichError::decode(&url, e))?;

        let succeeded: HashSet<&str> = results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.id.as_str())
            .collect();

        for result in results.iter().filter(|r| !r.success) {
            warn!(
                album = album_id,
                asset = %result.id,
                reason = result.error.as_deref().unwrap_or("unknown"),
                "Asset was not added"
            );
        }

        let mut all_ok = true;
        for id in asset_ids {
            if !succeeded.contains(id.as_str()) {
                all_ok = false;
                if !results.iter().any(|r| &r.id == id) {
                    warn!(album = album_id, asset = %id, "No result reported for asset");
                }
            }
        }
        Ok(all_ok)
    }
}
