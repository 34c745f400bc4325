//! 推送 token 获取
//!
//! 向推送后端注册并取回设备 token。这是唯一的异步操作，
//! 完成后由 `PushService::on_token_result` 投递 `OnTokenResult`。

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Token 客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// 注册接口（GET，返回 `{"token": "..."}`）
    pub endpoint: String,
    /// 超时时间 (秒)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Token 接口响应
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Token 客户端
#[derive(Debug)]
pub struct TokenClient {
    client: Client,
    config: TokenConfig,
}

impl TokenClient {
    pub fn new(config: TokenConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(anyhow!("token endpoint is required"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// 取回设备 token
    pub async fn fetch_token(&self) -> Result<String> {
        debug!(endpoint = %self.config.endpoint, "Requesting push token");

        let response = self
            .client
            .get(&self.config.endpoint)
            .send()
            .await
            .context("Token request failed")?
            .error_for_status()
            .context("Token endpoint returned an error")?;

        let body: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        if body.token.is_empty() {
            return Err(anyhow!("token endpoint returned an empty token"));
        }
        Ok(body.token)
    }
}
