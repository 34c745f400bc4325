//! 引擎桥接 - 向嵌入方脚本层投递事件
//!
//! 所有对外事件（token、收到消息、点击）都经过 `BridgeGateway`。
//! 投递是单向、至多一次的：目标不可用时直接丢弃，不排队也不重试。

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 默认接收事件的游戏对象名
pub const DEFAULT_BRIDGE_OBJECT: &str = "[Android] Bridge";

/// 对外事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    TokenResult,
    NotificationReceived,
    NotificationClicked,
}

impl BridgeEvent {
    /// 脚本层的方法名
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeEvent::TokenResult => "OnTokenResult",
            BridgeEvent::NotificationReceived => "OnNotificationReceived",
            BridgeEvent::NotificationClicked => "OnNotificationClicked",
        }
    }
}

impl std::fmt::Display for BridgeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 投递结果
#[derive(Debug, Clone, PartialEq)]
pub enum EmitResult {
    /// 已投递
    Sent,
    /// 目标不可用，已丢弃
    Dropped(String),
    /// 投递失败
    Failed(String),
}

/// 脚本层的消息入口（对应引擎的 SendMessage）
pub trait BridgeTarget: Send + Sync {
    /// 目标名称（用于日志）
    fn name(&self) -> &str;

    /// 引擎当前是否在运行
    fn is_active(&self) -> bool;

    /// 向 `object` 的 `method` 发送字符串消息
    fn send_message(&self, object: &str, method: &str, payload: &str) -> Result<()>;
}

/// 事件投递网关
pub struct BridgeGateway {
    target: Arc<dyn BridgeTarget>,
    object: String,
}

impl BridgeGateway {
    pub fn new(target: Arc<dyn BridgeTarget>) -> Self {
        Self {
            target,
            object: DEFAULT_BRIDGE_OBJECT.to_string(),
        }
    }

    /// 设置接收事件的游戏对象名
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = object.into();
        self
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    /// 投递事件，失败只记录日志
    pub fn emit(&self, method: &str, payload: &str) -> EmitResult {
        if !self.target.is_active() {
            debug!(
                target_name = self.target.name(),
                method,
                "Bridge target isn't running, dropping event"
            );
            return EmitResult::Dropped("target inactive".to_string());
        }

        match self.target.send_message(&self.object, method, payload) {
            Ok(()) => {
                debug!(target_name = self.target.name(), method, "Event sent to bridge");
                EmitResult::Sent
            }
            Err(e) => {
                warn!(target_name = self.target.name(), method, error = %e, "Bridge send failed");
                EmitResult::Failed(e.to_string())
            }
        }
    }

    /// 投递推送 token
    pub fn emit_token(&self, token: &str) -> EmitResult {
        self.emit(BridgeEvent::TokenResult.as_str(), token)
    }

    /// 投递收到的 payload
    pub fn emit_received(&self, data: &HashMap<String, String>) -> EmitResult {
        let payload = Value::Object(to_json_object(data)).to_string();
        self.emit(BridgeEvent::NotificationReceived.as_str(), &payload)
    }

    /// 投递点击事件：原始 payload 加上 `click_index`
    pub fn emit_clicked(&self, data: &HashMap<String, String>, click_index: u32) -> EmitResult {
        let mut object = to_json_object(data);
        object.insert("click_index".to_string(), Value::from(click_index));
        let payload = Value::Object(object).to_string();
        self.emit(BridgeEvent::NotificationClicked.as_str(), &payload)
    }
}

fn to_json_object(data: &HashMap<String, String>) -> Map<String, Value> {
    data.iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// 测试用的 mock 目标
    struct MockTarget {
        active: AtomicBool,
        fail: bool,
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl MockTarget {
        fn new(active: bool) -> Self {
            Self {
                active: AtomicBool::new(active),
                fail: false,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self { fail: true, ..Self::new(true) }
        }

        fn sent(&self) -> Vec<(String, String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl BridgeTarget for MockTarget {
        fn name(&self) -> &str {
            "mock"
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }

        fn send_message(&self, object: &str, method: &str, payload: &str) -> Result<()> {
            if self.fail {
                anyhow::bail!("engine crashed");
            }
            self.sent
                .lock()
                .unwrap()
                .push((object.to_string(), method.to_string(), payload.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_emit_token() {
        let target = Arc::new(MockTarget::new(true));
        let gateway = BridgeGateway::new(target.clone());

        assert_eq!(gateway.emit_token("tok-123"), EmitResult::Sent);
        assert_eq!(
            target.sent(),
            vec![(
                "[Android] Bridge".to_string(),
                "OnTokenResult".to_string(),
                "tok-123".to_string()
            )]
        );
    }

    #[test]
    fn test_inactive_target_drops_event() {
        let target = Arc::new(MockTarget::new(false));
        let gateway = BridgeGateway::new(target.clone());

        let result = gateway.emit_token("tok");
        assert!(matches!(result, EmitResult::Dropped(_)));
        assert!(target.sent().is_empty());

        target.active.store(true, Ordering::SeqCst);
        assert_eq!(gateway.emit_token("tok"), EmitResult::Sent);
    }

    #[test]
    fn test_send_failure_is_reported() {
        let gateway = BridgeGateway::new(Arc::new(MockTarget::failing()));
        assert_eq!(
            gateway.emit_token("tok"),
            EmitResult::Failed("engine crashed".to_string())
        );
    }

    #[test]
    fn test_emit_clicked_merges_index() {
        let target = Arc::new(MockTarget::new(true));
        let gateway = BridgeGateway::new(target.clone()).with_object("PushManager");

        let data: HashMap<String, String> =
            [("c.i".to_string(), "m1".to_string())].into_iter().collect();
        gateway.emit_clicked(&data, 1);

        let sent = target.sent();
        assert_eq!(sent[0].0, "PushManager");
        assert_eq!(sent[0].1, "OnNotificationClicked");
        let payload: Value = serde_json::from_str(&sent[0].2).unwrap();
        assert_eq!(payload, serde_json::json!({"c.i": "m1", "click_index": 1}));
    }

    #[test]
    fn test_emit_received_is_json() {
        let target = Arc::new(MockTarget::new(true));
        let gateway = BridgeGateway::new(target.clone());

        let data: HashMap<String, String> =
            [("title".to_string(), "Hi".to_string())].into_iter().collect();
        gateway.emit_received(&data);

        let sent = target.sent();
        assert_eq!(sent[0].1, "OnNotificationReceived");
        let payload: Value = serde_json::from_str(&sent[0].2).unwrap();
        assert_eq!(payload["title"], "Hi");
    }
}
