//! `upb clicks` / `upb clear-clicks` / `upb shade` - 查看本地状态

use anyhow::Result;
use clap::Args;

use super::output::format_output;
use crate::config::PushConfig;
use crate::push::platform::FileNotificationShade;
use crate::push::PushServiceBuilder;

/// 输出格式参数
#[derive(Args)]
pub struct ListArgs {
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 列出点击记录
pub fn handle_clicks(args: ListArgs, config: PushConfig) -> Result<()> {
    let service = PushServiceBuilder::new(config).build()?;
    let store = service.store();
    if !store.ensure_initialized() {
        anyhow::bail!("Click store is unavailable");
    }

    if args.json {
        println!("{}", store.read_all().unwrap_or_else(|| "[]".to_string()));
        return Ok(());
    }

    let clicks = store.clicks();
    println!("{} 条点击记录:\n", clicks.len());
    for click in clicks {
        let target = match click.action_index.as_str() {
            "0" => "通知主体".to_string(),
            n => format!("按钮 {}", n),
        };
        println!("  {}  {}", click.message_id, target);
    }
    Ok(())
}

/// 清空点击记录
pub fn handle_clear_clicks(config: PushConfig) -> Result<()> {
    let service = PushServiceBuilder::new(config).build()?;
    if service.store().ensure_initialized() {
        service.store().clear();
    }
    println!("点击记录已清空");
    Ok(())
}

/// 列出通知栏中的通知
pub fn handle_shade(args: ListArgs, config: PushConfig) -> Result<()> {
    let shade = FileNotificationShade::new(config.shade_path());
    let posted = shade.posted()?;

    if args.json {
        println!("{}", format_output(&posted));
        return Ok(());
    }

    println!("{} 条通知:\n", posted.len());
    for notification in posted {
        println!(
            "  [{}] {} - {}",
            notification.tag,
            notification.title.as_deref().unwrap_or("(无标题)"),
            notification.body.as_deref().unwrap_or("")
        );
        for action in &notification.actions {
            println!("      按钮 {}: {}", action.pending.intent.action_index, action.title);
        }
    }
    Ok(())
}
