//! Room, messaging and sync endpoints.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::client::MatrixClient;
use crate::error::MatrixResult;
use crate::http::request::PreparedRequest;

const DEFAULT_SYNC_WAIT: Duration = Duration::from_millis(30_000);

/// Result of resolving a room alias through the directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomAliasLookup {
    pub room_id: String,
    #[serde(default)]
    pub servers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RoomIdResponse {
    room_id: String,
}

#[derive(Debug, Deserialize)]
struct EventIdResponse {
    event_id: String,
}

#[derive(Debug, Deserialize)]
struct JoinedRoomsResponse {
    #[serde(default)]
    joined_rooms: Vec<String>,
}

/// Parameters of a `/sync` long poll.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub since: Option<String>,
    pub filter: Option<String>,
    pub full_state: Option<bool>,
    pub set_presence: Option<String>,
    /// How long the server may hold the request open. Defaults to 30s.
    pub timeout: Option<Duration>,
}

impl SyncOptions {
    pub fn since(mut self, token: impl Into<String>) -> Self {
        self.since = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl MatrixClient {
    pub fn joined_rooms(&self) -> MatrixResult<Vec<String>> {
        let url = self.authenticated_client_url("joined_rooms")?;
        let body = self.executor.execute_required(&PreparedRequest::get(url))?;
        let response: JoinedRoomsResponse = serde_json::from_str(&body)?;
        Ok(response.joined_rooms)
    }

    /// Join a room by id or alias; returns the room id.
    pub fn join_room(&self, room_id_or_alias: &str) -> MatrixResult<String> {
        let url = self.authenticated_client_url(&format!("join/{}", room_id_or_alias))?;
        let body = self
            .executor
            .execute_required(&PreparedRequest::post(url).json(&json!({}))?)?;
        let response: RoomIdResponse = serde_json::from_str(&body)?;
        tracing::debug!(room_id = %response.room_id, "Joined room");
        Ok(response.room_id)
    }

    pub fn lookup_room_alias(&self, alias: &str) -> MatrixResult<RoomAliasLookup> {
        let url = self.client_url(&format!("directory/room/{}", alias))?;
        let body = self.executor.execute_required(&PreparedRequest::get(url))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send an `m.text` message; returns the event id.
    pub fn send_text(&self, room_id: &str, text: &str) -> MatrixResult<String> {
        let txn_id = uuid::Uuid::new_v4().simple().to_string();
        let url = self.authenticated_client_url(&format!(
            "rooms/{}/send/m.room.message/{}",
            room_id, txn_id
        ))?;
        let content = json!({ "msgtype": "m.text", "body": text });
        let body = self
            .executor
            .execute_required(&PreparedRequest::put(url).json(&content)?)?;
        let response: EventIdResponse = serde_json::from_str(&body)?;
        Ok(response.event_id)
    }

    /// Long-poll `/sync`. The request timeout is extended by the server-side wait.
    pub fn sync(&self, options: &SyncOptions) -> MatrixResult<serde_json::Value> {
        let wait = options.timeout.unwrap_or(DEFAULT_SYNC_WAIT);
        let mut url = self.authenticated_client_url("sync")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("timeout", &wait.as_millis().to_string());
            if let Some(since) = &options.since {
                query.append_pair("since", since);
            }
            if let Some(filter) = &options.filter {
                query.append_pair("filter", filter);
            }
            if let Some(full_state) = options.full_state {
                query.append_pair("full_state", if full_state { "true" } else { "false" });
            }
            if let Some(presence) = &options.set_presence {
                query.append_pair("set_presence", presence);
            }
        }

        let request = PreparedRequest::get(url).timeout(self.executor.request_timeout() + wait);
        let body = self.executor.execute_required(&request)?;
        Ok(serde_json::from_str(&body)?)
    }
}
