//! 推送服务 - 组合解码、渲染、路由和桥接
//!
//! 对应系统的三个回调入口：收到推送、点击通知、token 就绪。

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::bridge::{BridgeGateway, EmitResult};
use super::intent::ActionIntent;
use super::message::Message;
use super::renderer::{NotificationRenderer, PlatformNotification};
use super::router::{ClickRouter, RouteResult};
use super::store::MessageStore;

/// 收到推送后的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiveResult {
    /// 已发布通知
    Rendered(PlatformNotification),
    /// payload 为空，未处理
    Empty,
    /// 不是推送消息（缺少 ID），只投递了原始数据
    NotAMessage,
    /// 发布通知失败
    Failed(String),
}

/// 推送服务
pub struct PushService {
    renderer: NotificationRenderer,
    router: ClickRouter,
    bridge: Arc<BridgeGateway>,
    store: Arc<MessageStore>,
}

impl PushService {
    pub fn new(
        renderer: NotificationRenderer,
        router: ClickRouter,
        bridge: Arc<BridgeGateway>,
        store: Arc<MessageStore>,
    ) -> Self {
        Self {
            renderer,
            router,
            bridge,
            store,
        }
    }

    /// 处理收到的推送 payload
    pub fn on_message_received(&self, data: HashMap<String, String>) -> ReceiveResult {
        if data.is_empty() {
            debug!("Received push without data, ignoring");
            return ReceiveResult::Empty;
        }

        self.bridge.emit_received(&data);

        let Some(message) = Message::decode(data) else {
            info!("Received push is not a displayable message");
            return ReceiveResult::NotAMessage;
        };

        match self.renderer.render(&message) {
            Ok(notification) => {
                info!(message_id = %message.id(), "Push notification rendered");
                ReceiveResult::Rendered(notification)
            }
            Err(e) => {
                warn!(message_id = %message.id(), error = %e, "Failed to render push notification");
                ReceiveResult::Failed(e.to_string())
            }
        }
    }

    /// 处理通知点击
    pub fn on_action(&self, intent: &ActionIntent) -> RouteResult {
        self.router.on_action(intent)
    }

    /// 处理 token 获取结果，成功时投递给脚本层
    pub fn on_token_result(&self, result: Result<String>) -> Option<EmitResult> {
        match result {
            Ok(token) => {
                debug!(token = %token, "Push token received");
                Some(self.bridge.emit_token(&token))
            }
            Err(e) => {
                warn!(error = %e, "Failed to get push token");
                None
            }
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn renderer(&self) -> &NotificationRenderer {
        &self.renderer
    }
}
