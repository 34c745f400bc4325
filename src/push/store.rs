//! 点击记录存储 - 持久化用户对通知的操作
//!
//! 记录格式为 JSON 数组，保存在 `MESSAGE_PREFERENCES` 命名空间的 `MESSAGE_DATA` key 下：
//! ```json
//! [{"action_index": "0", "messageId": "m1"}, {"action_index": "2", "messageId": "m2"}]
//! ```
//!
//! 只追加，不修改；可以整体读取或整体清空。
//!
//! 注意：`append` 是无锁的 读-改-写，两个回调并发追加时可能丢失其中一条记录。

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// 存储命名空间
pub const MESSAGE_PREFERENCES: &str = "MESSAGE_PREFERENCES";
/// 点击记录 key
pub const MESSAGE_DATA: &str = "MESSAGE_DATA";

/// 简单的字符串键值持久化
pub trait Preferences: Send + Sync {
    fn get_string(&self, key: &str) -> Result<Option<String>>;

    fn put_string(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// 内存实现（测试和嵌入使用）
#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Preferences for MemoryPreferences {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

/// 一条点击记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredClick {
    #[serde(rename = "messageId")]
    pub message_id: String,
    /// "0" 表示点击通知主体，"N" 表示第 N 个按钮
    pub action_index: String,
}

/// 延迟打开存储后端的工厂
pub type StoreOpener = Box<dyn Fn() -> Result<Arc<dyn Preferences>> + Send + Sync>;

/// 点击记录存储
///
/// 显式构造并通过 `Arc` 共享；初始化是幂等的，第一次设置的后端生效。
pub struct MessageStore {
    prefs: Mutex<Option<Arc<dyn Preferences>>>,
    opener: Option<StoreOpener>,
}

impl MessageStore {
    /// 创建未初始化的存储
    pub fn new() -> Self {
        Self {
            prefs: Mutex::new(None),
            opener: None,
        }
    }

    /// 创建已初始化的存储
    pub fn with_preferences(prefs: Arc<dyn Preferences>) -> Self {
        Self {
            prefs: Mutex::new(Some(prefs)),
            opener: None,
        }
    }

    /// 创建首次使用时才打开后端的存储
    pub fn lazy(opener: StoreOpener) -> Self {
        Self {
            prefs: Mutex::new(None),
            opener: Some(opener),
        }
    }

    /// 初始化存储，已初始化时不做任何事
    pub fn init(&self, prefs: Arc<dyn Preferences>) {
        let mut slot = self.slot();
        if slot.is_none() {
            *slot = Some(prefs);
        }
        debug!("MessageStore init");
    }

    /// 未初始化时用 opener 打开后端；返回存储是否可用
    pub fn ensure_initialized(&self) -> bool {
        let mut slot = self.slot();
        if slot.is_some() {
            return true;
        }
        let Some(open) = &self.opener else {
            return false;
        };
        match open() {
            Ok(prefs) => {
                *slot = Some(prefs);
                debug!("MessageStore lazily initialized");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to open message preferences");
                false
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.slot().is_some()
    }

    /// 追加一条点击记录，失败时返回 false（只记录日志）
    pub fn append(&self, message_id: &str, action_index: &str) -> bool {
        let Some(prefs) = self.backend() else {
            warn!("MessageStore isn't initialized");
            return false;
        };

        let mut records: Vec<Value> = match prefs.get_string(MESSAGE_DATA) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "Stored click log is corrupt");
                    return false;
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read click log");
                return false;
            }
        };

        records.push(serde_json::json!({
            "action_index": action_index,
            "messageId": message_id,
        }));

        let serialized = match serde_json::to_string(&records) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize click log");
                return false;
            }
        };

        match prefs.put_string(MESSAGE_DATA, &serialized) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to write click log");
                false
            }
        }
    }

    /// 读取原始 JSON 记录；未初始化或从未写入时返回 None
    pub fn read_all(&self) -> Option<String> {
        let Some(prefs) = self.backend() else {
            warn!("MessageStore isn't initialized");
            return None;
        };
        match prefs.get_string(MESSAGE_DATA) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read click log");
                None
            }
        }
    }

    /// 读取结构化的点击记录，跳过无法识别的条目
    pub fn clicks(&self) -> Vec<StoredClick> {
        let Some(raw) = self.read_all() else {
            return Vec::new();
        };
        let records: Vec<Value> = serde_json::from_str(&raw).unwrap_or_default();
        records
            .into_iter()
            .filter_map(|r| serde_json::from_value(r).ok())
            .collect()
    }

    /// 清空全部记录
    pub fn clear(&self) {
        let Some(prefs) = self.backend() else {
            warn!("MessageStore isn't initialized");
            return;
        };
        if let Err(e) = prefs.remove(MESSAGE_DATA) {
            warn!(error = %e, "Failed to clear click log");
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<dyn Preferences>>> {
        self.prefs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn backend(&self) -> Option<Arc<dyn Preferences>> {
        self.slot().clone()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn create_test_store() -> MessageStore {
        MessageStore::with_preferences(Arc::new(MemoryPreferences::new()))
    }

    /// 写入总是失败的后端
    struct BrokenPreferences;

    impl Preferences for BrokenPreferences {
        fn get_string(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn put_string(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_uninitialized_store() {
        let store = MessageStore::new();
        assert!(!store.is_initialized());
        assert!(!store.append("m1", "0"));
        assert!(store.read_all().is_none());
        store.clear();
    }

    #[test]
    fn test_append_then_read_all() {
        let store = create_test_store();
        assert!(store.read_all().is_none());

        assert!(store.append("m1", "0"));
        assert!(store.append("m1", "2"));

        let raw = store.read_all().unwrap();
        let records: Vec<Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records.last().unwrap(),
            &serde_json::json!({"messageId": "m1", "action_index": "2"})
        );
    }

    #[test]
    fn test_clicks_are_ordered() {
        let store = create_test_store();
        store.append("a", "1");
        store.append("b", "0");

        let clicks = store.clicks();
        assert_eq!(
            clicks,
            vec![
                StoredClick { message_id: "a".to_string(), action_index: "1".to_string() },
                StoredClick { message_id: "b".to_string(), action_index: "0".to_string() },
            ]
        );
    }

    #[test]
    fn test_clear_removes_log() {
        let store = create_test_store();
        store.append("m1", "1");
        store.clear();
        assert!(store.read_all().is_none());
        assert!(store.clicks().is_empty());
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = Arc::new(MemoryPreferences::new());
        let store = MessageStore::new();
        store.init(first.clone());
        store.init(Arc::new(MemoryPreferences::new()));

        store.append("m1", "0");
        assert!(first.get_string(MESSAGE_DATA).unwrap().is_some());
    }

    #[test]
    fn test_lazy_store_opens_once() {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = opened.clone();
        let store = MessageStore::lazy(Box::new(move || -> Result<Arc<dyn Preferences>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MemoryPreferences::new()))
        }));

        assert!(!store.is_initialized());
        assert!(store.ensure_initialized());
        assert!(store.ensure_initialized());
        assert!(store.append("m1", "0"));
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lazy_store_open_failure() {
        let store = MessageStore::lazy(Box::new(|| -> Result<Arc<dyn Preferences>> {
            Err(anyhow::anyhow!("no storage"))
        }));
        assert!(!store.ensure_initialized());
        assert!(!store.is_initialized());
        assert!(!MessageStore::new().ensure_initialized());
    }

    #[test]
    fn test_write_failure_returns_false() {
        let store = MessageStore::with_preferences(Arc::new(BrokenPreferences));
        assert!(!store.append("m1", "0"));
    }

    #[test]
    fn test_corrupt_log_returns_false() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.put_string(MESSAGE_DATA, "{not json").unwrap();
        let store = MessageStore::with_preferences(prefs);
        assert!(!store.append("m1", "0"));
    }
}
