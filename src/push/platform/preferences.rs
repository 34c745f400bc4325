//! 文件键值存储 - 每个命名空间一个 JSON 对象文件
//!
//! 每次写入都在文件锁下 读取-修改-写临时文件-原子替换。

use anyhow::{Context, Result};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::push::store::Preferences;

/// 基于 JSON 文件的键值存储
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    /// 打开（必要时创建目录）
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> Result<File> {
        let lock_path = self.path.with_extension("lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open {}", lock_path.display()))?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Corrupt preferences file {}", self.path.display()))
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(map)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let lock = self.lock_file()?;
        let mut map = self.read_map()?;
        f(&mut map);
        let result = self.write_map(&map);
        lock.unlock()?;
        result
    }
}

impl Preferences for FilePreferences {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let lock = self.lock_file()?;
        let map = self.read_map();
        lock.unlock()?;
        Ok(map?.get(key).cloned())
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|map| {
            map.remove(key);
        })
    }
}
