//! 系统启动器 - 用桌面的默认程序打开链接

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// 按顺序查找的打开命令
const OPENERS: &[&str] = &["xdg-open", "open"];

/// 桌面启动器
pub struct SystemLauncher {
    opener: Option<PathBuf>,
    /// 只记录不执行
    dry_run: bool,
}

impl SystemLauncher {
    pub fn new() -> Self {
        let opener = OPENERS.iter().find_map(|cmd| which::which(cmd).ok());
        debug!(opener = ?opener, "Detected URI opener");
        Self {
            opener,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::push::router::Launcher for SystemLauncher {
    fn open_uri(&self, uri: &str) -> Result<()> {
        if self.dry_run {
            eprintln!("[DRY-RUN] Would open: {}", uri);
            return Ok(());
        }

        let opener = self
            .opener
            .as_ref()
            .ok_or_else(|| anyhow!("No URI opener found (tried {})", OPENERS.join(", ")))?;

        // spawn 后立即返回，不等待浏览器退出
        Command::new(opener)
            .arg(uri)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }

    /// 桌面宿主没有可切换的嵌入方应用，这里只记录日志
    fn launch_app(&self) -> Result<()> {
        info!("Bringing app to foreground");
        Ok(())
    }
}
