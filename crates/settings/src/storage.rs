use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// 工作檢視狀態檔案的錯誤。 / Errors raised by the state file slot.
#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 單一設定槽的檔案儲存，內容為已編碼的狀態文字。 / File-backed single configuration slot holding the encoded state text.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 讀取槽內容；檔案不存在時回傳 `None`。 / Reads the slot, returning `None` when the file is absent.
    pub fn read(&self) -> Result<Option<String>, StateFileError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.trim().to_string())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StateFileError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// 以原子方式覆寫槽內容（最後寫入者為準）。 / Overwrites the slot atomically; the last writer wins.
    pub fn write(&self, blob: &str) -> Result<(), StateFileError> {
        write_atomic(&self.path, blob.as_bytes()).map_err(|source| StateFileError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), bytes = blob.len(), "state slot written");
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
