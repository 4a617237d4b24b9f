use std::io::{self, Write};

use async_trait::async_trait;
use workviews::{HostError, OpenEditor, WorkviewsHost};
use workviews_settings::StateFile;

/// Host without a UI: the settings slot is a file, the "open" layout comes
/// from the command line and document opens are printed to stdout.
/// 無介面的主機：設定槽為檔案，開啟的文件輸出至 stdout。
pub struct HeadlessHost {
    slot: StateFile,
    open: Vec<OpenEditor>,
}

impl HeadlessHost {
    pub fn new(slot: StateFile) -> Self {
        Self {
            slot,
            open: Vec::new(),
        }
    }

    pub fn set_open_editors(&mut self, open: Vec<OpenEditor>) {
        self.open = open;
    }

    pub fn slot(&self) -> &StateFile {
        &self.slot
    }
}

#[async_trait(?Send)]
impl WorkviewsHost for HeadlessHost {
    fn list_open_editors(&self) -> Vec<OpenEditor> {
        self.open.clone()
    }

    async fn close_all_editor_groups(&mut self) -> Result<(), HostError> {
        tracing::debug!(closed = self.open.len(), "closing all editor groups");
        self.open.clear();
        Ok(())
    }

    async fn open_document(
        &mut self,
        uri: &str,
        view_column: Option<u32>,
        _preview: bool,
    ) -> Result<(), HostError> {
        let column = view_column.unwrap_or(workviews::DEFAULT_VIEW_COLUMN);
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "open {uri} {column}").map_err(|err| HostError::OpenDocument {
            uri: uri.to_string(),
            message: err.to_string(),
        })?;
        self.open.push(OpenEditor::new(uri, Some(column)));
        Ok(())
    }

    fn read_persisted_blob(&self) -> Option<String> {
        match self.slot.read() {
            Ok(blob) => blob,
            Err(err) => {
                tracing::warn!(error = %err, "state file unreadable");
                None
            }
        }
    }

    async fn write_persisted_blob(&mut self, blob: &str) -> Result<(), HostError> {
        self.slot
            .write(blob)
            .map_err(|err| HostError::WriteState(err.to_string()))
    }

    fn notify_display_changed(&mut self) {
        tracing::trace!("display refresh requested");
    }
}
