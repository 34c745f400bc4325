//! Unity Push Bridge - 将推送消息桥接到 Unity 脚本层

pub mod cli;
pub mod config;
pub mod push;

pub use config::PushConfig;
pub use push::{
    decode_message, ActionIntent, BridgeGateway, ClickAction, ClickRouter, Message, MessageStore,
    NotificationRenderer, PushService, PushServiceBuilder, ReceiveResult, RouteResult,
};
