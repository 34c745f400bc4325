//! `upb receive` - 模拟收到一条推送

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::output::{format_output, parse_payload};
use crate::config::PushConfig;
use crate::push::{PushServiceBuilder, ReceiveResult};

/// receive 命令参数
#[derive(Args)]
pub struct ReceiveArgs {
    /// 推送 payload（JSON 对象）
    pub payload: String,
    /// Dry-run 模式（不真正打开链接）
    #[arg(long)]
    pub dry_run: bool,
}

/// 处理收到的推送
pub fn handle_receive(args: ReceiveArgs, config: PushConfig) -> Result<()> {
    let data = parse_payload(&args.payload)?;
    let service = PushServiceBuilder::new(config).dry_run(args.dry_run).build()?;

    match service.on_message_received(data) {
        ReceiveResult::Rendered(notification) => {
            info!(tag = %notification.tag, "Notification posted");
            println!("{}", format_output(&notification));
        }
        ReceiveResult::Empty => println!("Payload is empty, nothing to do"),
        ReceiveResult::NotAMessage => {
            println!("Payload has no message id, delivered without notification")
        }
        ReceiveResult::Failed(e) => anyhow::bail!("Failed to post notification: {}", e),
    }
    Ok(())
}
