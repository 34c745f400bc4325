//! 文件通知栏 - 在 JSON 文件中模拟系统通知栏
//!
//! 通知以 tag 为 key 保存，相同 tag 再次发布会替换旧通知。

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use tracing::debug;

use crate::push::renderer::{ChannelSpec, NotificationManager, PlatformNotification};

/// 通知栏状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShadeState {
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelSpec>,
    #[serde(default)]
    pub notifications: BTreeMap<String, PlatformNotification>,
}

/// 基于文件的通知管理器
pub struct FileNotificationShade {
    path: PathBuf,
}

impl FileNotificationShade {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 读取当前状态
    pub fn load(&self) -> Result<ShadeState> {
        if !self.path.exists() {
            return Ok(ShadeState::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Corrupt notification shade {}", self.path.display()))
    }

    /// 当前显示的通知
    pub fn posted(&self) -> Result<Vec<PlatformNotification>> {
        Ok(self.load()?.notifications.into_values().collect())
    }

    fn lock_file(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_path = self.path.with_extension("lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ShadeState),
    {
        let lock = self.lock_file()?;
        let result = self.load().and_then(|mut state| {
            f(&mut state);
            let temp_path = self.path.with_extension("tmp");
            fs::write(&temp_path, serde_json::to_string_pretty(&state)?)?;
            fs::rename(&temp_path, &self.path)?;
            Ok(())
        });
        lock.unlock()?;
        result
    }
}

impl NotificationManager for FileNotificationShade {
    fn channel_exists(&self, channel_id: &str) -> Result<bool> {
        Ok(self.load()?.channels.contains_key(channel_id))
    }

    fn create_channel(&self, channel: &ChannelSpec) -> Result<()> {
        self.update(|state| {
            state
                .channels
                .entry(channel.id.clone())
                .or_insert_with(|| channel.clone());
        })
    }

    fn notify(&self, notification: &PlatformNotification) -> Result<()> {
        self.update(|state| {
            if state
                .notifications
                .insert(notification.tag.clone(), notification.clone())
                .is_some()
            {
                debug!(tag = %notification.tag, "Replaced existing notification");
            }
        })
    }

    fn cancel(&self, tag: &str) -> Result<()> {
        self.update(|state| {
            state.notifications.remove(tag);
        })
    }
}
