use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const PREFERENCES_VERSION: u32 = 1;

/// Host setting key: keep the active workview across restarts.
pub const REMEMBER_ACTIVE_KEY: &str = "workviews.rememberActiveWorkview";
/// Host setting key: restore only visible or pinned editors.
pub const RESTORE_PINNED_ONLY_KEY: &str = "workviews.restorePinnedOnly";
/// Host setting key: seconds between deferred saves.
pub const SAVE_DEBOUNCE_KEY: &str = "workviews.saveDebounceSeconds";

const MAX_DEBOUNCE_SECONDS: u64 = 86_400;

/// 偏好設定檔案的錯誤。 / Errors raised while loading a preferences file.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Feature flags that shape how workviews are loaded, restored and saved.
/// 控制工作檢視載入、還原與儲存行為的設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkviewsPreferences {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_true")]
    pub remember_active_workview: bool,
    #[serde(default)]
    pub restore_pinned_only: bool,
    #[serde(default = "default_save_debounce")]
    pub save_debounce_seconds: u64,
}

fn default_version() -> u32 {
    PREFERENCES_VERSION
}

fn default_true() -> bool {
    true
}

fn default_save_debounce() -> u64 {
    300
}

impl Default for WorkviewsPreferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            remember_active_workview: true,
            restore_pinned_only: false,
            save_debounce_seconds: default_save_debounce(),
        }
    }
}

impl WorkviewsPreferences {
    /// Builds preferences from a host key lookup, falling back to defaults for
    /// keys that are missing or carry the wrong type.
    /// 依主機設定查詢建立偏好；缺少或型別錯誤時採用預設值。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Value>,
    {
        let mut prefs = Self::default();
        if let Some(value) = lookup(REMEMBER_ACTIVE_KEY) {
            match value.as_bool() {
                Some(flag) => prefs.remember_active_workview = flag,
                None => tracing::warn!(key = REMEMBER_ACTIVE_KEY, %value, "ignoring non-boolean setting"),
            }
        }
        if let Some(value) = lookup(RESTORE_PINNED_ONLY_KEY) {
            match value.as_bool() {
                Some(flag) => prefs.restore_pinned_only = flag,
                None => tracing::warn!(key = RESTORE_PINNED_ONLY_KEY, %value, "ignoring non-boolean setting"),
            }
        }
        if let Some(value) = lookup(SAVE_DEBOUNCE_KEY) {
            match value.as_u64() {
                Some(seconds) => prefs.save_debounce_seconds = seconds,
                None => tracing::warn!(key = SAVE_DEBOUNCE_KEY, %value, "ignoring non-integer setting"),
            }
        }
        prefs.sanitize();
        prefs
    }

    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = PREFERENCES_VERSION;
        }
        if self.save_debounce_seconds == 0 {
            self.save_debounce_seconds = default_save_debounce();
        }
        self.save_debounce_seconds = self.save_debounce_seconds.clamp(1, MAX_DEBOUNCE_SECONDS);
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_secs(self.save_debounce_seconds)
    }

    /// Reads a JSON preferences file; a missing file yields the defaults.
    /// 讀取偏好設定檔；檔案不存在時使用預設值。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no preferences file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(PreferencesError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut prefs: Self =
            serde_json::from_str(&contents).map_err(|source| PreferencesError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        prefs.sanitize();
        Ok(prefs)
    }
}
