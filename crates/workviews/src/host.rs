use async_trait::async_trait;
use serde_json::Value;

use crate::error::HostError;
use crate::model::OpenEditor;

/// Editor host the store drives: layout queries, document opening, the
/// persisted settings slot and display refresh.
/// 儲存區所驅動的編輯器主機介面。
///
/// Calls run on a single logical thread, so returned futures are not
/// required to be `Send`.
#[async_trait(?Send)]
pub trait WorkviewsHost {
    /// Editors currently open across all layout groups.
    fn list_open_editors(&self) -> Vec<OpenEditor>;

    async fn close_all_editor_groups(&mut self) -> Result<(), HostError>;

    /// Opens (and focuses) `uri` in the given column.
    async fn open_document(
        &mut self,
        uri: &str,
        view_column: Option<u32>,
        preview: bool,
    ) -> Result<(), HostError>;

    fn read_persisted_blob(&self) -> Option<String>;

    async fn write_persisted_blob(&mut self, blob: &str) -> Result<(), HostError>;

    /// Raw host setting lookup; `None` selects the default.
    fn read_setting(&self, _key: &str) -> Option<Value> {
        None
    }

    /// Fire-and-forget signal that displayed data changed.
    fn notify_display_changed(&mut self);
}
