//! 通知渲染 - 将消息转换为平台通知并发布
//!
//! 每条通知包含一个主体点击动作（序号 0）和每个按钮一个动作（序号 = 按钮序号）。
//! 所有动作都绑定一个 `ActionIntent`，点击后交给 `ClickRouter`。
//! 通知以消息 ID 作为 tag 发布，同一 ID 再次发布会替换旧通知。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::intent::{ActionIntent, ClickAction};
use super::message::Message;

/// 代表“默认提示音”的 sound 值
pub const SOUND_DEFAULT: &str = "default";

/// 通知渠道重要性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Min,
    Low,
    #[default]
    Default,
    High,
}

/// 通知渠道定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    /// 指示灯颜色（#RRGGBB）
    pub light_color: Option<String>,
    pub importance: Importance,
}

impl Default for ChannelSpec {
    fn default() -> Self {
        Self {
            id: "ly.count.unity.sdk.CountlyPush.CHANNEL_ID".to_string(),
            name: "Push notifications".to_string(),
            description: "Notifications sent by the game".to_string(),
            light_color: Some("#00FF00".to_string()),
            importance: Importance::Default,
        }
    }
}

/// 点击后的目标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "uri", rename_all = "snake_case")]
pub enum ActionTarget {
    /// 打开链接
    OpenUri(String),
    /// 只把应用切到前台
    OpenApp,
}

/// 延迟执行的点击回调
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    /// 每个动作唯一的请求码
    pub request_code: i32,
    pub target: ActionTarget,
    pub intent: ActionIntent,
}

/// 通知上的按钮
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub icon: i32,
    pub title: String,
    pub pending: PendingAction,
}

/// 构建好的平台通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformNotification {
    /// 通知 tag（消息 ID）
    pub tag: String,
    pub channel_id: String,
    pub small_icon: String,
    pub large_icon: Option<String>,
    pub color: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub sound: Option<String>,
    pub badge: Option<i32>,
    pub media_url: Option<String>,
    pub auto_cancel: bool,
    pub content_action: PendingAction,
    pub actions: Vec<NotificationAction>,
}

impl PlatformNotification {
    /// 按点击序号查找对应的 intent
    pub fn intent_for(&self, action: ClickAction) -> Option<&ActionIntent> {
        match action {
            ClickAction::BodyTap => Some(&self.content_action.intent),
            ClickAction::ButtonTap(_) => self
                .actions
                .iter()
                .map(|a| &a.pending.intent)
                .find(|intent| intent.action() == action),
        }
    }
}

/// 平台通知管理器
pub trait NotificationManager: Send + Sync {
    /// 平台是否要求先注册渠道
    fn requires_channels(&self) -> bool {
        true
    }

    fn channel_exists(&self, channel_id: &str) -> Result<bool>;

    fn create_channel(&self, channel: &ChannelSpec) -> Result<()>;

    /// 发布通知，相同 tag 替换旧通知
    fn notify(&self, notification: &PlatformNotification) -> Result<()>;

    /// 按 tag 移除通知
    fn cancel(&self, tag: &str) -> Result<()>;
}

/// 渲染配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub channel: ChannelSpec,
    pub small_icon: String,
    pub large_icon: Option<String>,
    /// 强调色（#RRGGBB）
    pub accent_color: Option<String>,
    /// sound 为空或为 "default" 时使用的提示音
    pub default_sound: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            channel: ChannelSpec::default(),
            small_icon: "ic_stat".to_string(),
            large_icon: Some("ic_stat".to_string()),
            accent_color: None,
            default_sound: None,
        }
    }
}

/// 通知渲染器
pub struct NotificationRenderer {
    manager: Arc<dyn NotificationManager>,
    config: RenderConfig,
}

impl NotificationRenderer {
    pub fn new(manager: Arc<dyn NotificationManager>, config: RenderConfig) -> Self {
        Self { manager, config }
    }

    /// 确保渠道存在（先检查再创建）
    pub fn ensure_channel(&self) -> Result<()> {
        if !self.manager.requires_channels() {
            return Ok(());
        }
        let channel = &self.config.channel;
        if self.manager.channel_exists(&channel.id)? {
            return Ok(());
        }
        self.manager
            .create_channel(channel)
            .with_context(|| format!("Failed to create notification channel {}", channel.id))?;
        info!(channel_id = %channel.id, "Notification channel created");
        Ok(())
    }

    /// 构建通知但不发布
    pub fn build(&self, message: &Message) -> PlatformNotification {
        let content_action = PendingAction {
            request_code: request_code(message.id(), 0),
            target: target_for(message.link().map(|u| u.as_str())),
            intent: ActionIntent::new(message, ClickAction::BodyTap),
        };

        let actions = message
            .buttons()
            .iter()
            .map(|button| NotificationAction {
                icon: button.icon(),
                title: button.title().to_string(),
                pending: PendingAction {
                    request_code: request_code(message.id(), button.index()),
                    target: target_for(button.link().map(|u| u.as_str())),
                    intent: ActionIntent::new(message, ClickAction::ButtonTap(button.index())),
                },
            })
            .collect();

        PlatformNotification {
            tag: message.id().to_string(),
            channel_id: self.config.channel.id.clone(),
            small_icon: self.config.small_icon.clone(),
            large_icon: self.config.large_icon.clone(),
            color: self.config.accent_color.clone(),
            title: message.title().map(str::to_string),
            body: message.body().map(str::to_string),
            sound: self.resolve_sound(message.sound()),
            badge: message.badge(),
            media_url: message.media_url().map(|u| u.to_string()),
            auto_cancel: true,
            content_action,
            actions,
        }
    }

    /// 构建并发布通知
    pub fn render(&self, message: &Message) -> Result<PlatformNotification> {
        self.ensure_channel()?;
        let notification = self.build(message);
        self.manager
            .notify(&notification)
            .with_context(|| format!("Failed to post notification {}", message.id()))?;
        debug!(
            message_id = %message.id(),
            actions = notification.actions.len(),
            "Notification posted"
        );
        Ok(notification)
    }

    fn resolve_sound(&self, sound: Option<&str>) -> Option<String> {
        match sound {
            None | Some(SOUND_DEFAULT) => self.config.default_sound.clone(),
            Some(uri) => Some(uri.to_string()),
        }
    }
}

fn target_for(link: Option<&str>) -> ActionTarget {
    match link {
        Some(uri) => ActionTarget::OpenUri(uri.to_string()),
        None => ActionTarget::OpenApp,
    }
}

/// 计算请求码：把点击序号作为消息 ID 后的一位继续参与 31 进制哈希
///
/// 同一消息的各个动作互不相同；不同消息之间仍可能碰撞（哈希溢出后），
/// 这时后发的 pending action 会覆盖先前的。
pub fn request_code(message_id: &str, index: u32) -> i32 {
    let hash = message_id
        .chars()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(c as i32));
    hash.wrapping_mul(31).wrapping_add(index as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::message::decode_message;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// 测试用的 mock 通知管理器
    #[derive(Default)]
    struct MockManager {
        channels: Mutex<Vec<String>>,
        posted: Mutex<Vec<PlatformNotification>>,
        create_calls: Mutex<usize>,
        no_channels: bool,
    }

    impl NotificationManager for MockManager {
        fn requires_channels(&self) -> bool {
            !self.no_channels
        }

        fn channel_exists(&self, channel_id: &str) -> Result<bool> {
            Ok(self.channels.lock().unwrap().iter().any(|c| c == channel_id))
        }

        fn create_channel(&self, channel: &ChannelSpec) -> Result<()> {
            *self.create_calls.lock().unwrap() += 1;
            self.channels.lock().unwrap().push(channel.id.clone());
            Ok(())
        }

        fn notify(&self, notification: &PlatformNotification) -> Result<()> {
            self.posted.lock().unwrap().push(notification.clone());
            Ok(())
        }

        fn cancel(&self, _tag: &str) -> Result<()> {
            Ok(())
        }
    }

    fn message(pairs: &[(&str, &str)]) -> Message {
        let data: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        decode_message(data).unwrap()
    }

    fn create_test_renderer() -> (NotificationRenderer, Arc<MockManager>) {
        let manager = Arc::new(MockManager::default());
        let config = RenderConfig {
            default_sound: Some("res://raw/boing".to_string()),
            accent_color: Some("#FF8800".to_string()),
            ..RenderConfig::default()
        };
        (NotificationRenderer::new(manager.clone(), config), manager)
    }

    #[test]
    fn test_render_posts_with_actions() {
        let (renderer, manager) = create_test_renderer();
        let msg = message(&[
            ("c.i", "m1"),
            ("title", "Hi"),
            ("message", "Hello"),
            ("c.l", "https://example.com/a"),
            ("c.b", r#"[{"t":"Open","l":"https://x"},{"t":"Later","l":"bad link"}]"#),
        ]);

        let notification = renderer.render(&msg).unwrap();

        assert_eq!(notification.tag, "m1");
        assert_eq!(notification.title.as_deref(), Some("Hi"));
        assert_eq!(notification.body.as_deref(), Some("Hello"));
        assert!(notification.auto_cancel);
        assert_eq!(notification.color.as_deref(), Some("#FF8800"));
        assert_eq!(
            notification.content_action.target,
            ActionTarget::OpenUri("https://example.com/a".to_string())
        );
        assert_eq!(notification.actions.len(), 2);
        assert_eq!(notification.actions[0].title, "Open");
        assert_eq!(notification.actions[0].pending.intent.action_index, 1);
        assert_eq!(notification.actions[1].pending.target, ActionTarget::OpenApp);
        assert_eq!(manager.posted.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_every_action_carries_message() {
        let (renderer, _manager) = create_test_renderer();
        let msg = message(&[("c.i", "m1"), ("c.b", r#"[{"t":"A","l":"https://a"}]"#)]);
        let notification = renderer.build(&msg);

        let body = notification.intent_for(ClickAction::BodyTap).unwrap();
        assert_eq!(body.message_id.as_deref(), Some("m1"));
        assert_eq!(body.action_index, 0);

        let button = notification.intent_for(ClickAction::ButtonTap(1)).unwrap();
        assert_eq!(button.decode_message().unwrap().id(), "m1");
        assert!(notification.intent_for(ClickAction::ButtonTap(2)).is_none());
    }

    #[test]
    fn test_body_without_link_opens_app() {
        let (renderer, _manager) = create_test_renderer();
        let notification = renderer.build(&message(&[("c.i", "m1")]));
        assert_eq!(notification.content_action.target, ActionTarget::OpenApp);
    }

    #[test]
    fn test_request_codes_are_distinct() {
        let (renderer, _manager) = create_test_renderer();
        let msg = message(&[
            ("c.i", "m1"),
            ("c.b", r#"[{"t":"A","l":"https://a"},{"t":"B","l":"https://b"}]"#),
        ]);
        let notification = renderer.build(&msg);

        let mut codes = vec![notification.content_action.request_code];
        codes.extend(notification.actions.iter().map(|a| a.pending.request_code));
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
        assert_eq!(codes[0], request_code("m1", 0));
    }

    #[test]
    fn test_request_codes_differ_across_adjacent_ids() {
        assert_ne!(request_code("m1", 1), request_code("m2", 0));
        assert_ne!(request_code("m1", 2), request_code("m3", 0));

        let mut codes = HashSet::new();
        for id in ["m1", "m2", "m3", "m10", "a", "b"] {
            for index in 0..4 {
                assert!(codes.insert(request_code(id, index)), "{id}/{index} collides");
            }
        }
    }

    #[test]
    fn test_channel_created_once() {
        let (renderer, manager) = create_test_renderer();
        renderer.render(&message(&[("c.i", "m1")])).unwrap();
        renderer.render(&message(&[("c.i", "m2")])).unwrap();
        assert_eq!(*manager.create_calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_channel_skipped_when_not_required() {
        let manager = Arc::new(MockManager {
            no_channels: true,
            ..MockManager::default()
        });
        let renderer = NotificationRenderer::new(manager.clone(), RenderConfig::default());
        renderer.render(&message(&[("c.i", "m1")])).unwrap();
        assert_eq!(*manager.create_calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_sound_resolution() {
        let (renderer, _manager) = create_test_renderer();

        let default = renderer.build(&message(&[("c.i", "m1"), ("sound", "default")]));
        assert_eq!(default.sound.as_deref(), Some("res://raw/boing"));

        let absent = renderer.build(&message(&[("c.i", "m1")]));
        assert_eq!(absent.sound.as_deref(), Some("res://raw/boing"));

        let custom = renderer.build(&message(&[("c.i", "m1"), ("sound", "res://raw/coin")]));
        assert_eq!(custom.sound.as_deref(), Some("res://raw/coin"));
    }
}
