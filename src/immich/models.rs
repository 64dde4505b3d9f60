use serde::Deserialize;
use serde_json::{Map, Value};

/// A single media item. Only `id` is interpreted; the rest of the payload is
/// kept as-is because the server schema changes between releases.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(flatten)]
    #[allow(dead_code)]
    pub extra: Map<String, Value>,
}

/// Response from `POST /api/search/metadata`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub assets: SearchPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub items: Vec<Asset>,
    #[serde(default)]
    pub next_page: Option<Value>,
}

impl SearchPage {
    /// The cursor for the following page. `null`, a missing key and an empty
    /// string all mean this was the last page.
    pub fn cursor(&self) -> Option<&Value> {
        match &self.next_page {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(v) => Some(v),
        }
    }
}

/// Response from `GET /api/albums/{id}`. Album metadata other than the
/// member list is ignored.
#[derive(Debug, Deserialize)]
pub struct AlbumResponse {
    pub assets: Vec<Asset>,
}

/// One entry of the per-id array returned by `PUT /api/albums/{id}/assets`.
#[derive(Debug, Deserialize)]
pub struct BulkIdResult {
    pub id: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}
