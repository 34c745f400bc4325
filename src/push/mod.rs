//! 推送桥接 - 解码推送、渲染通知、路由点击
//!
//! # 数据流
//! ```text
//! payload → Message::decode → NotificationRenderer::render → (用户点击) → ClickRouter::on_action
//!                                                                      ├→ MessageStore::append
//!                                                                      └→ BridgeGateway::emit
//! ```
//!
//! # 使用示例
//! ```ignore
//! use unity_push_bridge::{PushConfig, PushServiceBuilder};
//!
//! let service = PushServiceBuilder::new(PushConfig::load(None)?).build()?;
//! service.on_message_received(data);
//! ```

pub mod bridge;
pub mod builder;
pub mod intent;
pub mod message;
pub mod platform;
pub mod renderer;
pub mod router;
pub mod service;
pub mod store;
pub mod token;

pub use bridge::{BridgeEvent, BridgeGateway, BridgeTarget, EmitResult};
pub use builder::PushServiceBuilder;
pub use intent::{ActionIntent, ClickAction};
pub use message::{decode_message, Button, Message};
pub use renderer::{
    ActionTarget, ChannelSpec, NotificationManager, NotificationRenderer, PlatformNotification,
    RenderConfig,
};
pub use router::{ClickRouter, Launcher, RouteResult};
pub use service::{PushService, ReceiveResult};
pub use store::{MemoryPreferences, MessageStore, Preferences, StoredClick};
pub use token::{TokenClient, TokenConfig};
