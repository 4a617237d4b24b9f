//! Encoding of the store state into the single persisted settings slot.
//! 將儲存區狀態編碼至單一設定槽。
//!
//! The slot holds base64 over the JSON document
//! `{ "workviews": [...], "activeWorkviewID": "..." }`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::model::{Workview, WorkviewId};

/// Durable part of the store state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub workviews: Vec<Workview>,
    #[serde(
        rename = "activeWorkviewID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub active_workview_id: Option<WorkviewId>,
}

impl PersistedState {
    pub fn is_empty(&self) -> bool {
        self.workviews.is_empty() && self.active_workview_id.is_none()
    }
}

pub fn encode_state(state: &PersistedState) -> Result<String, CodecError> {
    let json = serde_json::to_string(state)?;
    Ok(BASE64.encode(json.as_bytes()))
}

pub fn decode_state(blob: &str) -> Result<PersistedState, CodecError> {
    let bytes = BASE64.decode(blob.trim().as_bytes())?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

/// Decodes the slot contents, falling back to the empty state when the slot
/// is absent or unreadable.
/// 解碼槽內容；不存在或無法解析時回傳空狀態。
pub fn decode_state_or_default(blob: Option<&str>) -> PersistedState {
    let blob = match blob.map(str::trim) {
        Some(blob) if !blob.is_empty() => blob,
        _ => {
            tracing::debug!("no persisted workviews state");
            return PersistedState::default();
        }
    };
    match decode_state(blob) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(error = %err, "workviews state was not decoded, starting empty");
            PersistedState::default()
        }
    }
}
