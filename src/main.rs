//! Unity Push Bridge CLI
//!
//! 在桌面环境下驱动推送流程：收到推送、点击通知、投递 token、查看本地状态

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use unity_push_bridge::{
    cli::{ClickArgs, ListArgs, ReceiveArgs, TokenArgs},
    PushConfig,
};

#[derive(Parser)]
#[command(name = "upb")]
#[command(about = "Unity Push Bridge - 解码推送、渲染通知、路由点击")]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/unity-push-bridge/config.json）
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 处理收到的推送 payload
    Receive(ReceiveArgs),
    /// 处理通知点击
    Click(ClickArgs),
    /// 获取推送 token 并投递给脚本层
    Token(TokenArgs),
    /// 列出点击记录
    Clicks(ListArgs),
    /// 清空点击记录
    ClearClicks,
    /// 列出通知栏中的通知
    Shade(ListArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug upb receive '{"c.i": "m1"}'
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("unity_push_bridge=info,upb=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let config = PushConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Receive(args) => unity_push_bridge::cli::handle_receive(args, config)?,
        Commands::Click(args) => unity_push_bridge::cli::handle_click(args, config)?,
        Commands::Token(args) => unity_push_bridge::cli::handle_token(args, config).await?,
        Commands::Clicks(args) => unity_push_bridge::cli::handle_clicks(args, config)?,
        Commands::ClearClicks => unity_push_bridge::cli::handle_clear_clicks(config)?,
        Commands::Shade(args) => unity_push_bridge::cli::handle_shade(args, config)?,
    }

    Ok(())
}
