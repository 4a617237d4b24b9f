//! Preferences and storage slots for the workviews feature.
//! 工作檢視功能的偏好設定與儲存槽。

pub mod preferences;
pub mod storage;

pub use preferences::{
    PreferencesError, WorkviewsPreferences, REMEMBER_ACTIVE_KEY,
    RESTORE_PINNED_ONLY_KEY, SAVE_DEBOUNCE_KEY,
};
pub use storage::{StateFile, StateFileError};
