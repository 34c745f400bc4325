//! 配置加载
//!
//! 配置文件：`~/.config/unity-push-bridge/config.json`（JSON 格式），不存在时使用默认值。
//!
//! ```json
//! {
//!   "bridge_object": "[Android] Bridge",
//!   "notification": {
//!     "channel": {"id": "game.push", "name": "Game", "description": "Game news"},
//!     "small_icon": "ic_stat",
//!     "accent_color": "#FF8800",
//!     "default_sound": "res://raw/boing"
//!   },
//!   "token": {"endpoint": "http://localhost:9090/token"}
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::push::bridge::DEFAULT_BRIDGE_OBJECT;
use crate::push::renderer::RenderConfig;
use crate::push::token::TokenConfig;

const APP_DIR: &str = "unity-push-bridge";

/// 推送桥接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushConfig {
    /// 接收事件的游戏对象名
    #[serde(default = "default_bridge_object")]
    pub bridge_object: String,
    /// 桥接目标是否处于运行状态
    #[serde(default = "default_true")]
    pub bridge_enabled: bool,
    /// 通知外观
    #[serde(default)]
    pub notification: RenderConfig,
    /// 状态目录（点击记录、通知栏、事件日志）
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    /// token 接口
    #[serde(default)]
    pub token: Option<TokenConfig>,
}

fn default_bridge_object() -> String {
    DEFAULT_BRIDGE_OBJECT.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            bridge_object: default_bridge_object(),
            bridge_enabled: true,
            notification: RenderConfig::default(),
            state_dir: None,
            token: None,
        }
    }
}

impl PushConfig {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        config_root().join("config.json")
    }

    /// 加载配置；文件不存在时返回默认配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// 状态目录
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(config_root)
    }

    /// 点击记录文件（键值存储的命名空间文件）
    pub fn preferences_path(&self, namespace: &str) -> PathBuf {
        self.state_dir().join(format!("{}.json", namespace))
    }

    /// 通知栏状态文件
    pub fn shade_path(&self) -> PathBuf {
        self.state_dir().join("notifications.json")
    }

    /// 桥接事件日志
    pub fn bridge_log_path(&self) -> PathBuf {
        self.state_dir().join("bridge_events.jsonl")
    }
}

fn config_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(APP_DIR)
}
