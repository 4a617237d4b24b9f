#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use workviews::{HostError, OpenEditor, WorkviewsHost};

/// In-memory host that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub open: Vec<OpenEditor>,
    pub blob: Option<String>,
    pub settings: HashMap<String, Value>,
    pub calls: Vec<String>,
    pub writes: usize,
    pub notifications: usize,
    pub failing_uri: Option<String>,
}

impl RecordingHost {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            ..Self::default()
        }
    }

    pub fn show(&mut self, editors: &[(&str, u32)]) {
        self.open = editors
            .iter()
            .map(|(uri, column)| OpenEditor::new(*uri, Some(*column)))
            .collect();
    }

    pub fn opened(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| call.strip_prefix("open ").map(str::to_string))
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

#[async_trait(?Send)]
impl WorkviewsHost for RecordingHost {
    fn list_open_editors(&self) -> Vec<OpenEditor> {
        self.open.clone()
    }

    async fn close_all_editor_groups(&mut self) -> Result<(), HostError> {
        self.calls.push("close-all".to_string());
        self.open.clear();
        Ok(())
    }

    async fn open_document(
        &mut self,
        uri: &str,
        view_column: Option<u32>,
        preview: bool,
    ) -> Result<(), HostError> {
        assert!(!preview, "documents must not open as preview");
        if self.failing_uri.as_deref() == Some(uri) {
            return Err(HostError::OpenDocument {
                uri: uri.to_string(),
                message: "file not found".to_string(),
            });
        }
        let column = view_column.unwrap_or(1);
        self.calls.push(format!("open {uri}@{column}"));
        self.open.push(OpenEditor::new(uri, Some(column)));
        Ok(())
    }

    fn read_persisted_blob(&self) -> Option<String> {
        self.blob.clone()
    }

    async fn write_persisted_blob(&mut self, blob: &str) -> Result<(), HostError> {
        self.blob = Some(blob.to_string());
        self.writes += 1;
        Ok(())
    }

    fn read_setting(&self, key: &str) -> Option<Value> {
        self.settings.get(key).cloned()
    }

    fn notify_display_changed(&mut self) {
        self.notifications += 1;
    }
}
