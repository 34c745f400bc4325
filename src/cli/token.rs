//! `upb token` - 获取推送 token 并投递给脚本层

use anyhow::{anyhow, Result};
use clap::Args;

use crate::config::PushConfig;
use crate::push::{EmitResult, PushServiceBuilder, TokenClient};

/// token 命令参数
#[derive(Args)]
pub struct TokenArgs {
    /// 直接使用给定的 token（不请求 token 接口）
    #[arg(long)]
    pub value: Option<String>,
}

/// 获取 token 并投递
pub async fn handle_token(args: TokenArgs, config: PushConfig) -> Result<()> {
    let result = match args.value {
        Some(token) => Ok(token),
        None => {
            let token_config = config
                .token
                .clone()
                .ok_or_else(|| {
                    anyhow!("No token endpoint configured, pass --value or set token.endpoint")
                })?;
            TokenClient::new(token_config)?.fetch_token().await
        }
    };

    let service = PushServiceBuilder::new(config).build()?;
    match service.on_token_result(result) {
        Some(EmitResult::Sent) => println!("Token delivered"),
        Some(EmitResult::Dropped(reason)) => println!("Token dropped: {}", reason),
        Some(EmitResult::Failed(e)) => anyhow::bail!("Failed to deliver token: {}", e),
        None => anyhow::bail!("Failed to get push token"),
    }
    Ok(())
}
