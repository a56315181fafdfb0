//! 错误类型：单项错误、汇总遍历错误、配置错误
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// 扫描过程中的单项错误
#[derive(Debug, Error)]
pub enum ScanError {
    /// 打开/读取/stat 单个文件失败
    #[error("{}: {source}", path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 遍历某个根目录失败（walkdir 的错误信息自带出错路径）
    #[error("{source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl ScanError {
    pub(crate) fn probe(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Probe { path: path.into(), source }
    }

    pub(crate) fn walk(root: impl Into<PathBuf>, source: walkdir::Error) -> Self {
        Self::Walk { root: root.into(), source }
    }

    /// 是否为权限不足（此类错误在任何层级都静默丢弃）
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Probe { source, .. } => source.kind() == io::ErrorKind::PermissionDenied,
            Self::Walk { source, .. } => is_walk_permission_denied(source),
        }
    }

    /// 出错的具体路径（遍历错误可能没有路径，退回根目录）
    pub fn path(&self) -> &Path {
        match self {
            Self::Probe { path, .. } => path,
            Self::Walk { root, source } => source.path().unwrap_or(root),
        }
    }
}

pub(crate) fn is_walk_permission_denied(err: &walkdir::Error) -> bool {
    err.io_error()
        .map(|e| e.kind() == io::ErrorKind::PermissionDenied)
        .unwrap_or(false)
}

/// 汇总后的遍历错误：每个失败的根目录一条，按记录先后排列
#[derive(Debug, Default)]
pub struct WalkError {
    failures: Vec<ScanError>,
}

impl WalkError {
    pub(crate) fn push(&mut self, err: ScanError) {
        self.failures.push(err);
    }

    /// 没有任何失败时返回 None，便于直接作为最终结果
    pub(crate) fn into_option(self) -> Option<Self> {
        if self.failures.is_empty() { None } else { Some(self) }
    }

    pub fn failures(&self) -> &[ScanError] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.failures.iter().enumerate() {
            if i > 0 { writeln!(f)?; }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for WalkError {}

/// 启动前的配置错误（流水线尚未启动，不会产生任何输出）
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("workers must be > 0")]
    NonPositiveWorkers,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
