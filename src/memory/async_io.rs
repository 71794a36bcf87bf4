//! 目录版槽位存储（异步文件 I/O）
//!
//! 每个槽位对应目录下的一个文件，文件名即槽位键。写入先落临时文件再 rename，
//! take 通过 rename 抢占文件实现「读取并删除」的原子性。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::StorageError;
use crate::memory::SlotStore;

/// 目录槽位存储
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    root: PathBuf,
}

impl FileSlotStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// 键只允许字母、数字与 `.` `_` `-`，防止路径逃逸
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

/// 读取文件；不存在时返回 None
async fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl SlotStore for FileSlotStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        Ok(read_optional(&path).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).await?;
        let tmp = self.root.join(format!(".{}.tmp", key));
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        let claimed = self
            .root
            .join(format!(".{}.taken-{}", key, uuid::Uuid::new_v4()));
        match fs::rename(&path, &claimed).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let value = fs::read_to_string(&claimed).await;
        if let Err(e) = fs::remove_file(&claimed).await {
            tracing::warn!("Failed to remove claimed slot file {:?}: {}", claimed, e);
        }
        Ok(Some(value?))
    }
}
