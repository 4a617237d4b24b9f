use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors raised while decoding or encoding the persisted state blob.
/// 解碼或編碼儲存狀態時的錯誤。
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("state blob is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("state blob is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("invalid workviews state payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported by the editor host.
/// 編輯器主機回報的失敗。
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to open {uri}: {message}")]
    OpenDocument { uri: String, message: String },
    #[error("failed to close editor groups: {0}")]
    CloseEditorGroups(String),
    #[error("failed to write workviews state: {0}")]
    WriteState(String),
}

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum WorkviewError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}
