//! Presentation tree over the store: sections, workviews and documents.
//! 工作檢視清單的呈現樹。

use crate::host::WorkviewsHost;
use crate::model::{Document, WorkviewId};
use crate::ordering::{compare_titles, uri_basename};
use crate::store::WorkviewStore;

pub const WORKVIEWS_SECTION_TITLE: &str = "Workviews";
pub const DOCUMENTS_SECTION_TITLE: &str = "Documents";

/// What a tree item refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    WorkviewSection,
    DocumentSection,
    Workview { id: WorkviewId, active: bool },
    Document { document: Document, pinned: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collapsible {
    None,
    Collapsed,
    Expanded,
}

/// Action the presentation layer binds to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeCommand {
    RestoreWorkview(WorkviewId),
    OpenDocument(Document),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub title: String,
    pub node: TreeNode,
}

impl TreeItem {
    /// Context key used by host menus.
    pub fn context_value(&self) -> &'static str {
        match &self.node {
            TreeNode::WorkviewSection => "section_workviews",
            TreeNode::DocumentSection => "section_relevant",
            TreeNode::Workview { .. } => "workview",
            TreeNode::Document { pinned: true, .. } => "document_pinned",
            TreeNode::Document { .. } => "document",
        }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self.node, TreeNode::Document { pinned: true, .. })
    }

    pub fn collapsible(&self) -> Collapsible {
        match &self.node {
            TreeNode::WorkviewSection | TreeNode::DocumentSection => Collapsible::Expanded,
            TreeNode::Workview { active: true, .. } => Collapsible::Expanded,
            TreeNode::Workview { .. } | TreeNode::Document { .. } => Collapsible::None,
        }
    }

    pub fn command(&self) -> Option<TreeCommand> {
        match &self.node {
            TreeNode::Workview { id, .. } => Some(TreeCommand::RestoreWorkview(id.clone())),
            TreeNode::Document { document, .. } => Some(TreeCommand::OpenDocument(document.clone())),
            TreeNode::WorkviewSection | TreeNode::DocumentSection => None,
        }
    }
}

impl<H: WorkviewsHost> WorkviewStore<H> {
    /// Top-level items: the active workview's documents (when one is active)
    /// followed by the workview list.
    pub fn tree_roots(&self) -> Vec<TreeItem> {
        let mut roots = Vec::with_capacity(2);
        if self.active_workview().is_some() {
            roots.push(TreeItem {
                title: DOCUMENTS_SECTION_TITLE.to_string(),
                node: TreeNode::DocumentSection,
            });
        }
        roots.push(TreeItem {
            title: WORKVIEWS_SECTION_TITLE.to_string(),
            node: TreeNode::WorkviewSection,
        });
        roots
    }

    pub fn tree_children(&self, item: &TreeItem) -> Vec<TreeItem> {
        match &item.node {
            TreeNode::WorkviewSection => self.workview_items(),
            TreeNode::DocumentSection => self.active_document_items(),
            TreeNode::Workview { id, .. } if self.active_workview_id() == Some(id) => {
                self.active_document_items()
            }
            TreeNode::Workview { .. } | TreeNode::Document { .. } => Vec::new(),
        }
    }

    fn workview_items(&self) -> Vec<TreeItem> {
        let active = self.active_workview_id();
        let mut items: Vec<TreeItem> = self
            .workviews()
            .iter()
            .map(|workview| TreeItem {
                title: workview.name().to_string(),
                node: TreeNode::Workview {
                    id: workview.id().clone(),
                    active: active == Some(workview.id()),
                },
            })
            .collect();
        items.sort_by(|a, b| {
            compare_titles(&a.title, &b.title).then_with(|| node_key(a).cmp(node_key(b)))
        });
        items
    }

    fn active_document_items(&self) -> Vec<TreeItem> {
        let Some(workview) = self.active_workview() else {
            return Vec::new();
        };
        let mut items: Vec<TreeItem> = workview
            .listed_documents()
            .into_iter()
            .map(|listed| TreeItem {
                title: uri_basename(&listed.document.uri).into_owned(),
                node: TreeNode::Document {
                    document: listed.document,
                    pinned: listed.pinned,
                },
            })
            .collect();
        items.sort_by(|a, b| {
            compare_titles(&a.title, &b.title).then_with(|| node_key(a).cmp(node_key(b)))
        });
        items
    }
}

/// Tie-break for equal titles: workview id or document uri.
fn node_key(item: &TreeItem) -> &str {
    match &item.node {
        TreeNode::Workview { id, .. } => id.as_str(),
        TreeNode::Document { document, .. } => &document.uri,
        TreeNode::WorkviewSection | TreeNode::DocumentSection => "",
    }
}
