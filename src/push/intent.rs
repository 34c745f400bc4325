//! 点击回调的交接数据
//!
//! 渲染时为通知主体和每个按钮生成一个 `ActionIntent`，用户点击后原样交给 `ClickRouter`。
//! 进程可能在渲染和点击之间重启，所以 intent 携带完整的原始 payload 而不是内存引用。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::message::Message;

/// 用户点击的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickAction {
    /// 点击通知主体（序号 0）
    BodyTap,
    /// 点击第 N 个按钮（序号从 1 开始）
    ButtonTap(u32),
}

impl ClickAction {
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => ClickAction::BodyTap,
            n => ClickAction::ButtonTap(n),
        }
    }

    pub fn index(&self) -> u32 {
        match self {
            ClickAction::BodyTap => 0,
            ClickAction::ButtonTap(n) => *n,
        }
    }
}

impl std::fmt::Display for ClickAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClickAction::BodyTap => write!(f, "body"),
            ClickAction::ButtonTap(n) => write!(f, "button {}", n),
        }
    }
}

/// 点击回调携带的数据
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionIntent {
    /// 消息 ID
    #[serde(default)]
    pub message_id: Option<String>,
    /// 点击序号，缺省为 0（通知主体）
    #[serde(default)]
    pub action_index: u32,
    /// 原始 payload，用于在回调中重新解码消息
    #[serde(default)]
    pub message: Option<HashMap<String, String>>,
}

impl ActionIntent {
    /// 为消息的某个点击位置创建 intent
    pub fn new(message: &Message, action: ClickAction) -> Self {
        Self {
            message_id: Some(message.id().to_string()),
            action_index: action.index(),
            message: Some(message.raw_data().clone()),
        }
    }

    pub fn action(&self) -> ClickAction {
        ClickAction::from_index(self.action_index)
    }

    /// 重新解码附带的消息
    pub fn decode_message(&self) -> Option<Message> {
        self.message.clone().and_then(Message::decode)
    }
}
