//! Ordering and tie-break rules shared by restore and listings.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::model::{Editor, Workview, DEFAULT_VIEW_COLUMN};

/// Sort key used when reopening editors: column first, then hidden editors
/// ahead of the visible one so the visible editor is opened last and stays
/// in front.
pub fn restore_key(editor: &Editor) -> u32 {
    editor
        .view_column
        .unwrap_or(DEFAULT_VIEW_COLUMN)
        .saturating_mul(10)
        .saturating_add(u32::from(editor.is_visible()))
}

/// Editors of `workview` in the order they must be opened.
///
/// With `pinned_only` set, editors that are neither visible nor pinned are
/// skipped. Equal keys keep their stored order.
pub fn restore_plan(workview: &Workview, pinned_only: bool) -> Vec<Editor> {
    let mut plan: Vec<Editor> = workview
        .editors()
        .filter(|editor| !pinned_only || editor.is_visible() || workview.is_pinned(&editor.uri))
        .cloned()
        .collect();
    plan.sort_by_key(restore_key);
    plan
}

/// Case-insensitive title comparison with the raw title as tie-break.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Display name for a document uri: the last segment of its path, with the
/// scheme, authority, query and fragment removed and `%XX` escapes decoded.
pub fn uri_basename(uri: &str) -> Cow<'_, str> {
    let end = uri.find(&['?', '#'][..]).unwrap_or(uri.len());
    let mut path = strip_scheme(&uri[..end]);
    if let Some(rest) = path.strip_prefix("//") {
        path = rest.find('/').map_or("", |slash| &rest[slash..]);
    }
    let path = path.trim_end_matches('/');
    let name = match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    };
    urlencoding::decode(name).unwrap_or(Cow::Borrowed(name))
}

fn strip_scheme(uri: &str) -> &str {
    let Some((scheme, rest)) = uri.split_once(':') else {
        return uri;
    };
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid {
        rest
    } else {
        uri
    }
}
