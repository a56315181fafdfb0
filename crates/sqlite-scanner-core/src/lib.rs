//! SQLite 数据库文件扫描核心库
//!
//! 设计要点：
//! - 不依赖扩展名，只比对文件头部 16 字节魔数 `"SQLite format 3\0"`。
//! - 扫描流水线：每个根目录一个遍历线程 → 有界路径队列 → 固定大小的探测线程池 →
//!   有界结果/告警队列 → 两个消费者（结果输出、告警输出）。
//! - 所有队列均为有界通道，慢消费者会把背压一路传回遍历线程，内存占用与目录树规模无关。
//! - 关闭顺序严格：遍历全部结束 → 路径队列关闭 → 探测线程全部退出 → 结果/告警队列关闭 → 消费者退出。
//! - 权限不足一律静默跳过；其余单文件错误仅告警；根目录遍历错误汇总为一个 `WalkError` 最后返回。

mod options;
mod types;
mod error;
mod roots;
mod probe;
mod walk;
mod output;
mod scan;

pub use options::{OutputMode, ScanOptions, ScanStats};
pub use types::{MatchRecord, Probe, ScanOutcome};
pub use error::{ConfigError, ScanError, WalkError};
pub use roots::resolve_roots;
pub use probe::{probe_header, SQLITE_MAGIC};
pub use walk::walk_root;
pub use output::{absolute_path, stream_matches, write_warnings};
pub use scan::{find_sqlite_files, scan_and_write, scan_paths};
