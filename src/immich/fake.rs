//! In-memory stand-in for an Immich server, driven through [`ApiSession`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use super::error::ImmichError;
use super::session::ApiSession;

pub(crate) const BASE_URL: &str = "http://immich.test";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    Get { path: String },
    Post { path: String, body: Value },
    Put { path: String, body: Value },
}

#[derive(Default)]
struct State {
    searches: HashMap<String, Vec<Vec<String>>>,
    failing_searches: HashSet<String>,
    raw_searches: VecDeque<Value>,
    raw_adds: VecDeque<Value>,
    albums: HashMap<String, Vec<String>>,
    rejected: HashSet<String>,
    requests: Vec<Request>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeImmich {
    state: Arc<Mutex<State>>,
}

/// Searches are keyed by their parameters minus the `page` cursor.
fn search_key(params: &Value) -> String {
    let mut params = params.clone();
    if let Some(map) = params.as_object_mut() {
        map.remove("page");
    }
    params.to_string()
}

fn bad_request(path: &str, message: &str) -> ImmichError {
    ImmichError::Status {
        endpoint: format!("{BASE_URL}{path}"),
        status: 400,
        message: message.to_string(),
    }
}

impl FakeImmich {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a paginated search result. Page `n` links to page `n + 1`
    /// with the cursor `"n + 1"`; the last page has a `null` cursor.
    pub(crate) fn set_search(&self, params: Value, pages: Vec<Vec<&str>>) {
        let pages = pages
            .into_iter()
            .map(|p| p.into_iter().map(str::to_owned).collect())
            .collect();
        let mut state = self.state.lock().unwrap();
        state.searches.insert(search_key(&params), pages);
    }

    pub(crate) fn fail_search(&self, params: Value) {
        let mut state = self.state.lock().unwrap();
        state.failing_searches.insert(search_key(&params));
    }

    /// Queue a verbatim search response, served before any registered search.
    pub(crate) fn push_raw_search(&self, response: Value) {
        self.state.lock().unwrap().raw_searches.push_back(response);
    }

    /// Queue a verbatim add-assets response.
    pub(crate) fn push_raw_add(&self, response: Value) {
        self.state.lock().unwrap().raw_adds.push_back(response);
    }

    pub(crate) fn set_album(&self, album_id: &str, members: &[&str]) {
        let members = members.iter().map(|m| (*m).to_owned()).collect();
        let mut state = self.state.lock().unwrap();
        state.albums.insert(album_id.to_owned(), members);
    }

    /// Make every add of `asset_id` fail with `no_permission`.
    pub(crate) fn reject_asset(&self, asset_id: &str) {
        self.state.lock().unwrap().rejected.insert(asset_id.to_owned());
    }

    pub(crate) fn album_members(&self, album_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.albums.get(album_id).cloned().unwrap_or_default()
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn add_requests(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                Request::Put { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    fn path(url: &str) -> String {
        url.strip_prefix(BASE_URL).unwrap_or(url).to_owned()
    }
}

fn assets_json(ids: &[String]) -> Vec<Value> {
    ids.iter().map(|id| json!({"id": id, "type": "IMAGE"})).collect()
}

#[async_trait::async_trait]
impl ApiSession for FakeImmich {
    async fn get_json(&self, url: &str) -> Result<Value, ImmichError> {
        let path = Self::path(url);
        let mut state = self.state.lock().unwrap();
        state.requests.push(Request::Get { path: path.clone() });

        let album_id = path
            .strip_prefix("/api/albums/")
            .ok_or_else(|| bad_request(&path, "unknown route"))?;
        let members = state
            .albums
            .get(album_id)
            .ok_or_else(|| bad_request(&path, "Not found or no album.read access"))?;
        Ok(json!({
            "id": album_id,
            "albumName": album_id,
            "assetCount": members.len(),
            "assets": assets_json(members),
        }))
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ImmichError> {
        let path = Self::path(url);
        let mut state = self.state.lock().unwrap();
        state.requests.push(Request::Post {
            path: path.clone(),
            body: body.clone(),
        });

        if path != "/api/search/metadata" {
            return Err(bad_request(&path, "unknown route"));
        }
        if let Some(raw) = state.raw_searches.pop_front() {
            return Ok(raw);
        }

        let key = search_key(body);
        if state.failing_searches.contains(&key) {
            return Err(ImmichError::Status {
                endpoint: url.to_owned(),
                status: 500,
                message: "Internal server error".to_string(),
            });
        }

        let page: usize = match &body["page"] {
            Value::String(s) => s.parse().map_err(|_| bad_request(&path, "page must be an integer"))?,
            Value::Number(n) => n.as_u64().unwrap_or(1) as usize,
            _ => 1,
        };
        let pages = state.searches.get(&key).cloned().unwrap_or_default();
        let items = pages.get(page.saturating_sub(1)).cloned().unwrap_or_default();
        let next_page = if page < pages.len() {
            Value::String((page + 1).to_string())
        } else {
            Value::Null
        };
        Ok(json!({
            "albums": {"items": [], "nextPage": null},
            "assets": {
                "items": assets_json(&items),
                "count": items.len(),
                "nextPage": next_page,
            }
        }))
    }

    async fn put_json(&self, url: &str, body: &Value) -> Result<Value, ImmichError> {
        let path = Self::path(url);
        let mut state = self.state.lock().unwrap();
        state.requests.push(Request::Put {
            path: path.clone(),
            body: body.clone(),
        });

        if let Some(raw) = state.raw_adds.pop_front() {
            return Ok(raw);
        }

        let album_id = path
            .strip_prefix("/api/albums/")
            .and_then(|rest| rest.strip_suffix("/assets"))
            .ok_or_else(|| bad_request(&path, "unknown route"))?
            .to_owned();
        let ids: Vec<String> = body["ids"]
            .as_array()
            .map(|ids| ids.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect())
            .unwrap_or_default();

        let State {
            albums, rejected, ..
        } = &mut *state;
        let members = albums
            .get_mut(&album_id)
            .ok_or_else(|| bad_request(&path, "Not found or no album.update access"))?;

        let results = ids
            .into_iter()
            .map(|id| {
                if rejected.contains(&id) {
                    json!({"id": id, "success": false, "error": "no_permission"})
                } else if members.contains(&id) {
                    json!({"id": id, "success": false, "error": "duplicate"})
                } else {
                    members.push(id.clone());
                    json!({"id": id, "success": true})
                }
            })
            .collect();
        Ok(Value::Array(results))
    }
}
