use std::rc::Rc;
use std::time::Instant;

use workviews_settings::WorkviewsPreferences;

use crate::clock::{Clock, SystemClock};
use crate::codec::{decode_state_or_default, encode_state, PersistedState};
use crate::error::WorkviewError;
use crate::host::WorkviewsHost;
use crate::model::{Document, Workview, WorkviewId};
use crate::ordering::restore_plan;

/// Owns the workview collection, the active pointer and persistence.
/// 管理工作檢視集合、目前作用中的檢視與持久化。
///
/// Every mutating operation borrows the store mutably, so a restore or start
/// cannot overlap another one; callers queue them.
pub struct WorkviewStore<H: WorkviewsHost> {
    host: H,
    workviews: Vec<Workview>,
    active_workview_id: Option<WorkviewId>,
    preferences: WorkviewsPreferences,
    clock: Rc<dyn Clock>,
    last_saved_at: Instant,
}

impl<H: WorkviewsHost> WorkviewStore<H> {
    /// Loads the store with preferences read through the host settings.
    pub fn load(host: H) -> Self {
        let preferences = WorkviewsPreferences::from_lookup(|key| host.read_setting(key));
        Self::load_with(host, preferences, Rc::new(SystemClock))
    }

    /// Loads the persisted state from the host slot. Unreadable state yields
    /// an empty store; this never fails.
    /// 從主機設定槽載入狀態；無法解析時以空集合開始。
    pub fn load_with(host: H, preferences: WorkviewsPreferences, clock: Rc<dyn Clock>) -> Self {
        let blob = host.read_persisted_blob();
        let state = decode_state_or_default(blob.as_deref());
        let PersistedState {
            workviews,
            active_workview_id,
        } = state;

        let active_workview_id = match active_workview_id {
            Some(_) if !preferences.remember_active_workview => None,
            Some(id) if workviews.iter().any(|w| w.id() == &id) => Some(id),
            Some(id) => {
                tracing::warn!(workview = %id, "dropping active pointer to missing workview");
                None
            }
            None => None,
        };

        tracing::info!(
            workviews = workviews.len(),
            active = active_workview_id.is_some(),
            "workviews loaded"
        );
        let last_saved_at = clock.now();
        Self {
            host,
            workviews,
            active_workview_id,
            preferences,
            clock,
            last_saved_at,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn preferences(&self) -> &WorkviewsPreferences {
        &self.preferences
    }

    pub fn workviews(&self) -> &[Workview] {
        &self.workviews
    }

    pub fn workview(&self, id: &WorkviewId) -> Option<&Workview> {
        self.workviews.iter().find(|w| w.id() == id)
    }

    /// Looks a workview up by id, then by exact name.
    pub fn resolve(&self, reference: &str) -> Option<&Workview> {
        self.workviews
            .iter()
            .find(|w| w.id().as_str() == reference)
            .or_else(|| self.workviews.iter().find(|w| w.name() == reference))
    }

    pub fn active_workview_id(&self) -> Option<&WorkviewId> {
        self.active_workview_id.as_ref()
    }

    pub fn active_workview(&self) -> Option<&Workview> {
        let id = self.active_workview_id.as_ref()?;
        self.workview(id)
    }

    fn active_workview_mut(&mut self) -> Option<&mut Workview> {
        let id = self.active_workview_id.as_ref()?;
        self.workviews.iter_mut().find(|w| w.id() == id)
    }

    /// Durable part of the current state.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            workviews: self.workviews.clone(),
            active_workview_id: self.active_workview_id.clone(),
        }
    }

    /// Captures the open layout into the active workview, clears the pointer
    /// and closes every editor group.
    async fn deactivate(&mut self) -> Result<(), WorkviewError> {
        let open = self.host.list_open_editors();
        tracing::debug!(open = open.len(), "deactivating current workview");
        if let Some(workview) = self.active_workview_mut() {
            workview.reconcile_from_open_editors(&open);
        }
        self.active_workview_id = None;
        self.host.close_all_editor_groups().await?;
        Ok(())
    }

    /// Starts a fresh, empty workview and makes it active.
    /// 建立新的空白工作檢視並設為作用中。
    pub async fn start_new_workview(&mut self, name: &str) -> Result<WorkviewId, WorkviewError> {
        tracing::info!(name = name.trim(), "starting new workview");
        self.deactivate().await?;

        let workview = Workview::new(name.trim());
        let id = workview.id().clone();
        self.workviews.push(workview);
        self.active_workview_id = Some(id.clone());

        self.save().await?;
        Ok(id)
    }

    /// Reopens the editors of `id` and makes it active. Returns `false` when
    /// no such workview exists.
    /// 重新開啟工作檢視的編輯器並設為作用中。
    ///
    /// Editors open one at a time in [`restore_plan`] order so the host ends
    /// with the right editor focused in each column.
    pub async fn restore_workview(&mut self, id: &WorkviewId) -> Result<bool, WorkviewError> {
        if self.workview(id).is_none() {
            tracing::warn!(workview = %id, "restore requested for unknown workview");
            return Ok(false);
        }
        tracing::info!(workview = %id, "restoring workview");
        self.deactivate().await?;

        let plan = match self.workview(id) {
            Some(workview) => restore_plan(workview, self.preferences.restore_pinned_only),
            None => Vec::new(),
        };
        for editor in &plan {
            self.host
                .open_document(&editor.uri, editor.view_column, false)
                .await?;
        }

        self.active_workview_id = Some(id.clone());
        self.save().await?;
        Ok(true)
    }

    pub async fn rename_workview(
        &mut self,
        id: &WorkviewId,
        new_name: &str,
    ) -> Result<bool, WorkviewError> {
        let Some(workview) = self.workviews.iter_mut().find(|w| w.id() == id) else {
            tracing::warn!(workview = %id, "rename requested for unknown workview");
            return Ok(false);
        };
        tracing::debug!(workview = %id, name = new_name.trim(), "renaming workview");
        workview.set_name(new_name.trim());
        self.save().await?;
        Ok(true)
    }

    /// Removes a workview; the active pointer is cleared with it.
    pub async fn delete_workview(&mut self, id: &WorkviewId) -> Result<bool, WorkviewError> {
        let before = self.workviews.len();
        self.workviews.retain(|w| w.id() != id);
        let removed = self.workviews.len() != before;
        if self.active_workview_id.as_ref() == Some(id) {
            self.active_workview_id = None;
        }
        if removed {
            tracing::info!(workview = %id, "deleted workview");
        } else {
            tracing::warn!(workview = %id, "delete requested for unknown workview");
        }
        self.save().await?;
        Ok(removed)
    }

    /// Applies `op` to the active workview. A reported change, or
    /// `force_save`, goes through [`Self::notify_changed`]. Without an active
    /// workview nothing happens and `false` is returned.
    pub async fn for_active_workview<F>(
        &mut self,
        op: F,
        force_save: bool,
    ) -> Result<bool, WorkviewError>
    where
        F: FnOnce(&mut Workview) -> bool,
    {
        let Some(workview) = self.active_workview_mut() else {
            return Ok(false);
        };
        let changed = op(workview);
        if changed || force_save {
            self.notify_changed(force_save).await?;
        }
        Ok(changed)
    }

    pub async fn remove_editor(&mut self, uri: &str) -> Result<bool, WorkviewError> {
        self.for_active_workview(|w| w.remove_editor(uri), true)
            .await
    }

    pub async fn pin_document(&mut self, document: Document) -> Result<bool, WorkviewError> {
        self.for_active_workview(|w| w.pin_document(document), true)
            .await
    }

    pub async fn unpin_document(&mut self, uri: &str) -> Result<bool, WorkviewError> {
        self.for_active_workview(|w| w.unpin_document(uri), true)
            .await
    }

    /// Opens a listed document at its last known column, never as preview.
    pub async fn open_document(&mut self, document: &Document) -> Result<(), WorkviewError> {
        self.host
            .open_document(&document.uri, document.last_view_column, false)
            .await?;
        Ok(())
    }

    /// Tab layout changed in the host.
    pub async fn handle_window_tab_changed(&mut self) -> Result<(), WorkviewError> {
        self.sync_active_with_host().await
    }

    /// Visible editor set changed in the host.
    pub async fn handle_visible_editors_changed(&mut self) -> Result<(), WorkviewError> {
        self.sync_active_with_host().await
    }

    async fn sync_active_with_host(&mut self) -> Result<(), WorkviewError> {
        let open = self.host.list_open_editors();
        let Some(workview) = self.active_workview_mut() else {
            return Ok(());
        };
        workview.reconcile_from_open_editors(&open);
        self.notify_changed(false).await?;
        Ok(())
    }

    /// Writes the encoded state to the host slot and refreshes the display.
    /// 將編碼後的狀態寫入主機設定槽並通知畫面更新。
    pub async fn save(&mut self) -> Result<(), WorkviewError> {
        let blob = encode_state(&self.snapshot())?;
        tracing::debug!(
            workviews = self.workviews.len(),
            bytes = blob.len(),
            "saving workviews state"
        );
        self.host.write_persisted_blob(&blob).await?;
        self.host.notify_display_changed();
        self.last_saved_at = self.clock.now();
        Ok(())
    }

    /// Saves when forced or when the debounce window has passed since the
    /// last save; otherwise only refreshes the display. Returns whether a
    /// save happened.
    pub async fn notify_changed(&mut self, force_save: bool) -> Result<bool, WorkviewError> {
        let elapsed = self.clock.now().saturating_duration_since(self.last_saved_at);
        if force_save || elapsed > self.preferences.save_debounce() {
            self.save().await?;
            Ok(true)
        } else {
            tracing::trace!(?elapsed, "deferring save");
            self.host.notify_display_changed();
            Ok(false)
        }
    }

    /// Final unconditional save when the host shuts the feature down.
    pub async fn shutdown(&mut self) -> Result<(), WorkviewError> {
        tracing::debug!("saving workviews state before shutdown");
        self.save().await
    }
}
