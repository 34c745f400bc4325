//! 推送服务构建器 - 按配置组装各组件
//!
//! 未显式指定的平台能力使用 `platform` 中的桌面实现。

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use super::bridge::{BridgeGateway, BridgeTarget};
use super::platform::{FileNotificationShade, FilePreferences, JsonlBridge, SystemLauncher};
use super::renderer::{NotificationManager, NotificationRenderer};
use super::router::{ClickRouter, Launcher};
use super::service::PushService;
use super::store::{MessageStore, Preferences, MESSAGE_PREFERENCES};
use crate::config::PushConfig;

/// 推送服务构建器
pub struct PushServiceBuilder {
    config: PushConfig,
    dry_run: bool,
    preferences: Option<Arc<dyn Preferences>>,
    manager: Option<Arc<dyn NotificationManager>>,
    launcher: Option<Arc<dyn Launcher>>,
    bridge: Option<Arc<dyn BridgeTarget>>,
}

impl PushServiceBuilder {
    pub fn new(config: PushConfig) -> Self {
        Self {
            config,
            dry_run: false,
            preferences: None,
            manager: None,
            launcher: None,
            bridge: None,
        }
    }

    /// 设置 dry-run 模式（不真正打开链接）
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 使用指定的键值存储（否则首次点击时打开状态目录下的文件）
    pub fn preferences(mut self, preferences: Arc<dyn Preferences>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn notification_manager(mut self, manager: Arc<dyn NotificationManager>) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn bridge_target(mut self, bridge: Arc<dyn BridgeTarget>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// 构建 PushService
    pub fn build(self) -> Result<PushService> {
        let config = self.config;

        let store = match self.preferences {
            Some(prefs) => MessageStore::with_preferences(prefs),
            None => {
                let path = config.preferences_path(MESSAGE_PREFERENCES);
                MessageStore::lazy(Box::new(move || -> Result<Arc<dyn Preferences>> {
                    Ok(Arc::new(FilePreferences::open(path.clone())?))
                }))
            }
        };
        let store = Arc::new(store);

        let manager = self
            .manager
            .unwrap_or_else(|| Arc::new(FileNotificationShade::new(config.shade_path())));
        let launcher = self
            .launcher
            .unwrap_or_else(|| Arc::new(SystemLauncher::new().with_dry_run(self.dry_run)));
        let target = self.bridge.unwrap_or_else(|| {
            Arc::new(JsonlBridge::new(config.bridge_log_path()).with_active(config.bridge_enabled))
        });

        info!(
            bridge = target.name(),
            object = %config.bridge_object,
            channel_id = %config.notification.channel.id,
            "Building push service"
        );

        let bridge = Arc::new(BridgeGateway::new(target).with_object(config.bridge_object.clone()));
        let renderer = NotificationRenderer::new(manager.clone(), config.notification.clone());
        let router = ClickRouter::new(store.clone(), bridge.clone(), launcher, manager);

        Ok(PushService::new(renderer, router, bridge, store))
    }
}
