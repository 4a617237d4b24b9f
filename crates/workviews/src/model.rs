use std::fmt;

use indexmap::IndexMap;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::serde_keyed::{self, Keyed};

/// Column used when the host does not report one.
pub const DEFAULT_VIEW_COLUMN: u32 = 1;

/// Stable identifier for workviews.
/// 工作檢視的穩定代號。
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkviewId(String);

impl WorkviewId {
    /// Generates a fresh random identifier.
    /// 產生新的隨機識別碼。
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an identifier read from persisted state (older states use
    /// millisecond timestamps).
    /// 包裝從儲存狀態讀回的識別碼。
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorkviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One open view of a document at a layout column.
/// 文件在某個版面欄位中的開啟檢視。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Editor {
    pub uri: String,
    #[serde(
        default,
        deserialize_with = "lenient_column",
        skip_serializing_if = "Option::is_none"
    )]
    pub view_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl Editor {
    pub fn new(uri: impl Into<String>, view_column: Option<u32>, visible: bool) -> Self {
        Self {
            uri: uri.into(),
            view_column,
            visible: Some(visible),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(false)
    }

    /// Drops visibility and keeps the column as the last known position.
    /// 捨棄可見狀態，將欄位保留為最後位置。
    pub fn to_document(&self) -> Document {
        Document {
            uri: self.uri.clone(),
            last_view_column: self.view_column,
        }
    }
}

impl Keyed for Editor {
    fn key(&self) -> &str {
        &self.uri
    }
}

/// Lightweight reference to a document, derived from an editor or pinned.
/// 文件的輕量參考，來自編輯器或釘選。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub uri: String,
    #[serde(
        default,
        deserialize_with = "lenient_column",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_view_column: Option<u32>,
}

impl Document {
    pub fn new(uri: impl Into<String>, last_view_column: Option<u32>) -> Self {
        Self {
            uri: uri.into(),
            last_view_column,
        }
    }
}

impl Keyed for Document {
    fn key(&self) -> &str {
        &self.uri
    }
}

/// Column value as found in persisted state. Anything that is not a
/// positive column reads as unset.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawColumn {
    Int(i64),
    Float(f64),
    Other(IgnoredAny),
}

impl RawColumn {
    fn into_column(self) -> Option<u32> {
        match self {
            RawColumn::Int(value) => u32::try_from(value).ok().filter(|c| *c >= 1),
            RawColumn::Float(value) if (1.0..=f64::from(u32::MAX)).contains(&value) => {
                Some(value as u32)
            }
            RawColumn::Float(_) | RawColumn::Other(_) => None,
        }
    }
}

fn lenient_column<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawColumn>::deserialize(deserializer)?;
    Ok(raw.and_then(RawColumn::into_column))
}

/// Editor reported by the host as currently open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenEditor {
    pub uri: String,
    pub view_column: Option<u32>,
    pub is_active: bool,
}

impl OpenEditor {
    pub fn new(uri: impl Into<String>, view_column: Option<u32>) -> Self {
        Self {
            uri: uri.into(),
            view_column,
            is_active: false,
        }
    }
}

/// Document as shown in a listing, flagged when it comes from the pin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedDocument {
    pub document: Document,
    pub pinned: bool,
}

/// A named snapshot of an editor layout.
/// 具名的編輯器版面快照。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workview {
    id: WorkviewId,
    #[serde(default)]
    name: String,
    #[serde(default, with = "serde_keyed")]
    editors: IndexMap<String, Editor>,
    #[serde(default, with = "serde_keyed")]
    pinned_documents: IndexMap<String, Document>,
}

impl Workview {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(WorkviewId::new(), name)
    }

    pub fn with_id(id: WorkviewId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            editors: IndexMap::new(),
            pinned_documents: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &WorkviewId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn editors(&self) -> impl Iterator<Item = &Editor> {
        self.editors.values()
    }

    pub fn editor(&self, uri: &str) -> Option<&Editor> {
        self.editors.get(uri)
    }

    pub fn editor_count(&self) -> usize {
        self.editors.len()
    }

    pub fn pinned_documents(&self) -> impl Iterator<Item = &Document> {
        self.pinned_documents.values()
    }

    pub fn is_pinned(&self, uri: &str) -> bool {
        self.pinned_documents.contains_key(uri)
    }

    /// Inserts or replaces the editor stored under its uri; an existing entry
    /// keeps its position.
    pub fn upsert_editor(&mut self, editor: Editor) {
        self.editors.insert(editor.uri.clone(), editor);
    }

    /// Merges the host's open editors into the stored set.
    /// 將主機目前開啟的編輯器合併進既有集合。
    ///
    /// Stored editors are kept but marked hidden; every open editor is
    /// upserted as visible with its column defaulting to
    /// [`DEFAULT_VIEW_COLUMN`]. Repeated uris resolve to the last one listed.
    pub fn reconcile_from_open_editors(&mut self, open_editors: &[OpenEditor]) {
        for editor in self.editors.values_mut() {
            editor.visible = Some(false);
        }
        for open in open_editors {
            self.upsert_editor(Editor::new(
                open.uri.clone(),
                Some(open.view_column.unwrap_or(DEFAULT_VIEW_COLUMN)),
                true,
            ));
        }
        tracing::debug!(
            workview = %self.id,
            open = open_editors.len(),
            stored = self.editors.len(),
            "reconciled editors"
        );
    }

    /// Returns `true` when an editor was removed.
    pub fn remove_editor(&mut self, uri: &str) -> bool {
        self.editors.shift_remove(uri).is_some()
    }

    /// Returns `true` when the document was not pinned before.
    pub fn pin_document(&mut self, document: Document) -> bool {
        if self.pinned_documents.contains_key(&document.uri) {
            return false;
        }
        self.pinned_documents.insert(document.uri.clone(), document);
        true
    }

    /// Returns `true` when a pinned document was removed.
    pub fn unpin_document(&mut self, uri: &str) -> bool {
        self.pinned_documents.shift_remove(uri).is_some()
    }

    /// Documents derived from the stored editors, in editor order.
    pub fn documents(&self) -> Vec<Document> {
        self.editors.values().map(Editor::to_document).collect()
    }

    /// Editor-derived documents merged with the pin list. A pinned entry
    /// replaces the derived one for the same uri and keeps its slot; pins
    /// without an editor follow in pin order.
    pub fn listed_documents(&self) -> Vec<ListedDocument> {
        let mut merged: IndexMap<&str, ListedDocument> = IndexMap::new();
        for editor in self.editors.values() {
            merged.insert(
                editor.uri.as_str(),
                ListedDocument {
                    document: editor.to_document(),
                    pinned: false,
                },
            );
        }
        for pinned in self.pinned_documents.values() {
            merged.insert(
                pinned.uri.as_str(),
                ListedDocument {
                    document: pinned.clone(),
                    pinned: true,
                },
            );
        }
        merged.into_values().collect()
    }
}
