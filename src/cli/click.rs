//! `upb click` - 模拟用户点击通知

use anyhow::{anyhow, Result};
use clap::Args;

use super::output::parse_payload;
use crate::config::PushConfig;
use crate::push::{ActionIntent, PushServiceBuilder, RouteResult};

/// click 命令参数
#[derive(Args)]
pub struct ClickArgs {
    /// 完整的 intent JSON（`{"message_id", "action_index", "message"}`）
    #[arg(conflicts_with_all = ["message_id", "payload"])]
    pub intent: Option<String>,
    /// 消息 ID（默认取 payload 中的 c.i）
    #[arg(long)]
    pub message_id: Option<String>,
    /// 点击序号：0 为通知主体，N 为第 N 个按钮
    #[arg(long, default_value = "0")]
    pub index: u32,
    /// 原始推送 payload（JSON 对象）
    #[arg(long)]
    pub payload: Option<String>,
    /// Dry-run 模式（不真正打开链接）
    #[arg(long)]
    pub dry_run: bool,
}

impl ClickArgs {
    fn to_intent(&self) -> Result<ActionIntent> {
        if let Some(json) = &self.intent {
            return serde_json::from_str(json).map_err(|e| anyhow!("Invalid intent JSON: {}", e));
        }

        let message = self.payload.as_deref().map(parse_payload).transpose()?;
        let message_id = self
            .message_id
            .clone()
            .or_else(|| message.as_ref().and_then(|m| m.get("c.i").cloned()));

        Ok(ActionIntent {
            message_id,
            action_index: self.index,
            message,
        })
    }
}

/// 处理通知点击
pub fn handle_click(args: ClickArgs, config: PushConfig) -> Result<()> {
    let intent = args.to_intent()?;
    let service = PushServiceBuilder::new(config).dry_run(args.dry_run).build()?;

    match service.on_action(&intent) {
        RouteResult::Routed {
            message_id,
            action,
            opened_uri,
            stored,
        } => {
            println!("Routed {} click on {}", action, message_id);
            if let Some(uri) = opened_uri {
                println!("  opened: {}", uri);
            }
            if !stored {
                println!("  (click not recorded)");
            }
        }
        RouteResult::Ignored(reason) => println!("Click ignored: {}", reason),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(intent: Option<&str>, payload: Option<&str>, index: u32) -> ClickArgs {
        ClickArgs {
            intent: intent.map(str::to_string),
            message_id: None,
            index,
            payload: payload.map(str::to_string),
            dry_run: true,
        }
    }

    #[test]
    fn test_intent_from_payload() {
        let intent = args(None, Some(r#"{"c.i": "m1"}"#), 2).to_intent().unwrap();
        assert_eq!(intent.message_id.as_deref(), Some("m1"));
        assert_eq!(intent.action_index, 2);
    }

    #[test]
    fn test_intent_from_json() {
        let intent = args(Some(r#"{"message_id": "m9", "message": {"c.i": "m9"}}"#), None, 0)
            .to_intent()
            .unwrap();
        assert_eq!(intent.action_index, 0);
        assert_eq!(intent.decode_message().unwrap().id(), "m9");
    }

    #[test]
    fn test_intent_without_payload() {
        let intent = args(None, None, 1).to_intent().unwrap();
        assert!(intent.message.is_none());
    }
}
