//! 点击路由 - 处理用户对通知主体或按钮的点击
//!
//! 处理流程：
//! 1. 从 intent 解码消息，失败则记录日志后忽略
//! 2. 根据点击序号解析链接（0 = 消息链接，N = 第 N 个按钮的链接）
//! 3. 写入点击记录
//! 4. 将应用切到前台，有链接时同时打开链接
//! 5. 移除通知
//! 6. 向桥接层投递 `OnNotificationClicked`
//!
//! 这里是系统回调入口，任何失败都不能向上抛出。

use anyhow::Result;
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::bridge::BridgeGateway;
use super::intent::{ActionIntent, ClickAction};
use super::message::Message;
use super::renderer::NotificationManager;
use super::store::MessageStore;

/// 打开链接或应用的平台能力
pub trait Launcher: Send + Sync {
    /// 用系统默认方式打开链接
    fn open_uri(&self, uri: &str) -> Result<()>;

    /// 将嵌入方应用切到前台
    fn launch_app(&self) -> Result<()>;
}

/// 路由结果
#[derive(Debug, Clone, PartialEq)]
pub enum RouteResult {
    /// 已处理
    Routed {
        message_id: String,
        action: ClickAction,
        opened_uri: Option<String>,
        stored: bool,
    },
    /// 无法处理，已忽略
    Ignored(String),
}

/// 点击路由器
pub struct ClickRouter {
    store: Arc<MessageStore>,
    bridge: Arc<BridgeGateway>,
    launcher: Arc<dyn Launcher>,
    manager: Arc<dyn NotificationManager>,
}

impl ClickRouter {
    pub fn new(
        store: Arc<MessageStore>,
        bridge: Arc<BridgeGateway>,
        launcher: Arc<dyn Launcher>,
        manager: Arc<dyn NotificationManager>,
    ) -> Self {
        Self {
            store,
            bridge,
            launcher,
            manager,
        }
    }

    /// 处理一次点击回调
    pub fn on_action(&self, intent: &ActionIntent) -> RouteResult {
        let Some(message) = intent.decode_message() else {
            warn!(
                message_id = ?intent.message_id,
                "Click intent carries no decodable message, ignoring"
            );
            return RouteResult::Ignored("message missing".to_string());
        };

        if let Some(id) = intent.message_id.as_deref() {
            if id != message.id() {
                debug!(
                    intent_id = %id,
                    message_id = %message.id(),
                    "Intent id differs from message id"
                );
            }
        }

        let action = intent.action();
        debug!(message_id = %message.id(), %action, "Routing notification click");

        let stored = self.store_click(message.id(), action);

        let uri = resolve_link(&message, action);
        if let Err(e) = self.launcher.launch_app() {
            warn!(error = %e, "Failed to bring app to foreground");
        }
        if let Some(uri) = uri {
            match self.launcher.open_uri(uri.as_str()) {
                Ok(()) => {
                    info!(message_id = %message.id(), uri = %uri, "Opened notification link")
                }
                Err(e) => warn!(uri = %uri, error = %e, "Failed to open notification link"),
            }
        }

        if let Err(e) = self.manager.cancel(message.id()) {
            warn!(message_id = %message.id(), error = %e, "Failed to dismiss notification");
        }

        self.bridge.emit_clicked(message.raw_data(), action.index());

        RouteResult::Routed {
            message_id: message.id().to_string(),
            action,
            opened_uri: uri.map(|u| u.to_string()),
            stored,
        }
    }

    fn store_click(&self, message_id: &str, action: ClickAction) -> bool {
        if !self.store.ensure_initialized() || message_id.is_empty() {
            warn!(message_id, "Click not recorded, store unavailable");
            return false;
        }

        let stored = self.store.append(message_id, &action.index().to_string());
        debug!(message_id, stored, "Stored click");
        stored
    }
}

/// 解析点击对应的链接，序号越界时视为无链接
pub fn resolve_link(message: &Message, action: ClickAction) -> Option<&Url> {
    match action {
        ClickAction::BodyTap => message.link(),
        ClickAction::ButtonTap(index) => {
            let button = message.buttons().iter().find(|b| b.index() == index);
            if button.is_none() {
                warn!(message_id = %message.id(), index, "Clicked button doesn't exist");
            }
            button.and_then(|b| b.link())
        }
    }
}
