//! JSONL 桥接目标 - 把投递给脚本层的事件写入本地文件
//!
//! 每行一条记录：
//! ```json
//! {"ts":"2026-10-19T08:00:00Z","object":"[Android] Bridge","method":"OnTokenResult","payload":"tok"}
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::push::bridge::BridgeTarget;

/// 桥接事件记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRecord {
    pub ts: DateTime<Utc>,
    pub object: String,
    pub method: String,
    pub payload: String,
}

/// 写入 JSONL 文件的桥接目标
pub struct JsonlBridge {
    path: PathBuf,
    active: bool,
}

impl JsonlBridge {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            active: true,
        }
    }

    /// 设置引擎是否在运行（不运行时事件被丢弃）
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// 读取所有记录，跳过无法解析的行
    pub fn read_all(&self) -> Vec<BridgeRecord> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };
        BufReader::new(file)
            .lines()
            .filter_map(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect()
    }
}

impl BridgeTarget for JsonlBridge {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn send_message(&self, object: &str, method: &str, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = BridgeRecord {
            ts: Utc::now(),
            object: object.to_string(),
            method: method.to_string(),
            payload: payload.to_string(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        file.lock_exclusive()?;
        let written = writeln!(file, "{}", serde_json::to_string(&record)?);
        file.unlock()?;
        written?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::bridge::{BridgeGateway, EmitResult};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_events_are_appended() {
        let temp = tempdir().unwrap();
        let bridge = Arc::new(JsonlBridge::new(temp.path().join("events.jsonl")));
        let gateway = BridgeGateway::new(bridge.clone());

        gateway.emit_token("tok-1");
        gateway.emit_token("tok-2");

        let records = bridge.read_all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].method, "OnTokenResult");
        assert_eq!(records[1].payload, "tok-2");
        assert_eq!(records[0].object, "[Android] Bridge");
    }

    #[test]
    fn test_inactive_bridge_writes_nothing() {
        let temp = tempdir().unwrap();
        let bridge =
            Arc::new(JsonlBridge::new(temp.path().join("events.jsonl")).with_active(false));
        let gateway = BridgeGateway::new(bridge.clone());

        assert!(matches!(gateway.emit_token("tok"), EmitResult::Dropped(_)));
        assert!(bridge.read_all().is_empty());
    }
}
