//! 桌面平台实现 - 用本地文件模拟系统能力
//!
//! 在非 Android 环境下运行推送流程：键值存储、通知栏、启动器、引擎桥接都落到本地文件或系统命令。

pub mod bridge_log;
pub mod launcher;
pub mod preferences;
pub mod shade;

pub use bridge_log::{BridgeRecord, JsonlBridge};
pub use launcher::SystemLauncher;
pub use preferences::FilePreferences;
pub use shade::{FileNotificationShade, ShadeState};
