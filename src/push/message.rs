//! Payload 解码 - 将推送 payload 转换为结构化消息
//!
//! 推送 payload 是一个字符串到字符串的映射，识别的 key：
//!
//! | key       | 含义                               |
//! |-----------|------------------------------------|
//! | `c.i`     | 消息 ID（必需）                     |
//! | `title`   | 标题                               |
//! | `message` | 正文                               |
//! | `sound`   | `"default"` 或资源 URI              |
//! | `badge`   | 角标数字                            |
//! | `c.l`     | 点击通知主体时打开的链接              |
//! | `c.m`     | 媒体图片 URL                        |
//! | `c.b`     | 按钮 JSON 数组 `[{"t": ..., "l": ...}]` |
//!
//! 除 ID 外，所有字段都是尽力解析：解析失败只会让该字段为空，不影响其他字段。

use reqwest::Url;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub const KEY_ID: &str = "c.i";
pub const KEY_LINK: &str = "c.l";
pub const KEY_MEDIA: &str = "c.m";
pub const KEY_BUTTONS: &str = "c.b";
pub const KEY_BUTTONS_TITLE: &str = "t";
pub const KEY_BUTTONS_LINK: &str = "l";
pub const KEY_SOUND: &str = "sound";
pub const KEY_BADGE: &str = "badge";
pub const KEY_TITLE: &str = "title";
pub const KEY_MESSAGE: &str = "message";

/// 媒体 URL 允许的协议
const MEDIA_SCHEMES: &[&str] = &["http", "https", "ftp", "file"];

/// 通知上的操作按钮
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    index: u32,
    title: String,
    link: Option<Url>,
    icon: i32,
}

impl Button {
    pub fn new(index: u32, title: impl Into<String>, link: Option<Url>) -> Self {
        Self {
            index,
            title: title.into(),
            link,
            icon: 0,
        }
    }

    /// 设置图标资源（0 表示无图标）
    pub fn with_icon(mut self, icon: i32) -> Self {
        self.icon = icon;
        self
    }

    /// 按钮序号，从 1 开始
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> Option<&Url> {
        self.link.as_ref()
    }

    pub fn icon(&self) -> i32 {
        self.icon
    }
}

/// 解码后的推送消息，构造后不可变
#[derive(Debug, Clone)]
pub struct Message {
    id: String,
    title: Option<String>,
    body: Option<String>,
    sound: Option<String>,
    badge: Option<i32>,
    link: Option<Url>,
    media_url: Option<Url>,
    buttons: Vec<Button>,
    raw_data: HashMap<String, String>,
}

impl Message {
    /// 从 payload 解码消息，缺少 ID 时返回 None
    pub fn decode(data: HashMap<String, String>) -> Option<Self> {
        let id = match data.get(KEY_ID) {
            Some(id) if !id.is_empty() => id.clone(),
            _ => {
                debug!("Payload has no message id, not a push message");
                return None;
            }
        };

        let badge = data.get(KEY_BADGE).and_then(|v| parse_badge(v));
        let link = data.get(KEY_LINK).and_then(|v| parse_link(v));
        let media_url = data.get(KEY_MEDIA).and_then(|v| parse_media(v));
        let buttons = data
            .get(KEY_BUTTONS)
            .map(|v| parse_buttons(v))
            .unwrap_or_default();

        debug!(message_id = %id, buttons = buttons.len(), "Decoded push message");

        Some(Self {
            title: data.get(KEY_TITLE).cloned(),
            body: data.get(KEY_MESSAGE).cloned(),
            sound: data.get(KEY_SOUND).cloned(),
            id,
            badge,
            link,
            media_url,
            buttons,
            raw_data: data,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn sound(&self) -> Option<&str> {
        self.sound.as_deref()
    }

    pub fn badge(&self) -> Option<i32> {
        self.badge
    }

    pub fn link(&self) -> Option<&Url> {
        self.link.as_ref()
    }

    pub fn media_url(&self) -> Option<&Url> {
        self.media_url.as_ref()
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// 原始 payload（包含所有标准 key）
    pub fn raw_data(&self) -> &HashMap<String, String> {
        &self.raw_data
    }

    /// payload 中所有 key
    pub fn data_keys(&self) -> HashSet<&str> {
        self.raw_data.keys().map(String::as_str).collect()
    }

    pub fn has(&self, key: &str) -> bool {
        self.raw_data.contains_key(key)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.raw_data.get(key).map(String::as_str)
    }
}

/// 解码 payload，等价于 [`Message::decode`]
pub fn decode_message(data: HashMap<String, String>) -> Option<Message> {
    Message::decode(data)
}

/// 解析角标，非法数字视为无角标
pub fn parse_badge(text: &str) -> Option<i32> {
    match text.parse::<i32>() {
        Ok(badge) => Some(badge),
        Err(e) => {
            warn!(badge = %text, error = %e, "Bad badge value received, ignoring");
            None
        }
    }
}

/// 解析链接（主体链接和按钮链接共用）
pub fn parse_link(text: &str) -> Option<Url> {
    match Url::parse(text) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(link = %text, error = %e, "Cannot parse message link, ignoring");
            None
        }
    }
}

/// 解析媒体 URL，只接受可下载的协议
pub fn parse_media(text: &str) -> Option<Url> {
    match Url::parse(text) {
        Ok(url) if MEDIA_SCHEMES.contains(&url.scheme()) => Some(url),
        Ok(url) => {
            warn!(media = %text, scheme = url.scheme(), "Unsupported media scheme, ignoring");
            None
        }
        Err(e) => {
            warn!(media = %text, error = %e, "Bad media value received, ignoring");
            None
        }
    }
}

/// 解析按钮 JSON 数组
///
/// 缺少标题或链接的条目被跳过，但仍占用序号：第 i 个条目（从 0 开始）的按钮序号为 i + 1。
/// 整个数组无法解析时返回空列表。
pub fn parse_buttons(json: &str) -> Vec<Button> {
    let entries: Vec<Value> = match serde_json::from_str(json) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Failed to parse buttons JSON, dropping all buttons");
            return Vec::new();
        }
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let title = entry.get(KEY_BUTTONS_TITLE).and_then(Value::as_str);
            let link = entry.get(KEY_BUTTONS_LINK).and_then(Value::as_str);
            match (title, link) {
                (Some(title), Some(link)) => {
                    Some(Button::new(i as u32 + 1, title, parse_link(link)))
                }
                _ => {
                    debug!(position = i, "Skipping button without title or link");
                    None
                }
            }
        })
        .collect()
}
