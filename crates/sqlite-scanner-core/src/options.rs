//! 扫描选项与统计信息（模块）
use crate::error::{ConfigError, WalkError};

/// 结果输出格式（三选一）
/// - Plain：每行一个绝对路径，可选附带 ` (N bytes)`
/// - Json：`{ "entries": [ ... ] }` 形式的格式化 JSON 对象，边扫描边输出
/// - JsonLines：每行一个紧凑 JSON 对象，无外层数组
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Plain,
    Json,
    JsonLines,
}

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 探测线程数，必须 ≥ 1；默认等于 CPU 核数
    pub workers: usize,
    /// 输出格式
    pub output: OutputMode,
    /// 是否在输出中附带文件大小
    pub show_size: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            output: OutputMode::Plain,
            show_size: false,
        }
    }
}

impl ScanOptions {
    /// 启动前校验；失败时流水线不会启动
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_workers(self.workers)
    }
}

pub(crate) fn validate_workers(workers: usize) -> Result<(), ConfigError> {
    if workers == 0 { return Err(ConfigError::NonPositiveWorkers); }
    Ok(())
}

/// 队列容量：路径队列 = workers*4，结果队列 = workers*2，告警队列 = workers
pub(crate) fn path_queue_capacity(workers: usize) -> usize { workers.saturating_mul(4) }
pub(crate) fn match_queue_capacity(workers: usize) -> usize { workers.saturating_mul(2) }
pub(crate) fn error_queue_capacity(workers: usize) -> usize { workers }

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default)]
pub struct ScanStats {
    pub matches_written: usize,
    pub warnings: usize,
    pub walk_error: Option<WalkError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        let opts = ScanOptions::default();
        assert!(opts.workers >= 1);
        assert_eq!(opts.output, OutputMode::Plain);
        assert!(!opts.show_size);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let opts = ScanOptions { workers: 0, ..ScanOptions::default() };
        assert!(matches!(opts.validate(), Err(ConfigError::NonPositiveWorkers)));
    }

    #[test]
    fn queue_capacities_scale_with_workers() {
        assert_eq!(path_queue_capacity(3), 12);
        assert_eq!(match_queue_capacity(3), 6);
        assert_eq!(error_queue_capacity(3), 3);
    }
}
