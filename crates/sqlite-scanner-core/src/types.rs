//! 公共类型（对外暴露）
use serde::Serialize;
use std::path::PathBuf;

use crate::error::{ScanError, WalkError};

/// 一次确认的魔数命中：路径 + 文件字节数
///
/// 路径保持遍历时的原样（可能为相对路径），输出时再转换为绝对路径。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MatchRecord {
    pub path: PathBuf,
    pub size: u64,
}

/// 单个文件的探测结果（错误走 `Result` 的 Err 分支）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Match(MatchRecord),
    NoMatch,
}

/// 非流式扫描的完整结果
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// 命中项（顺序取决于探测线程的竞争，不保证与遍历顺序一致）
    pub matches: Vec<MatchRecord>,
    /// 非权限类的单文件错误
    pub warnings: Vec<ScanError>,
    /// 汇总后的根目录遍历错误；全部根目录遍历成功时为 None
    pub walk_error: Option<WalkError>,
}

/// 输出项结构（JSON Lines 模式下每行一个）
#[derive(Debug, Clone, Serialize)]
pub(crate) struct OutputItem<'a> {
    pub path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}
