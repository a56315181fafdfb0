//! 根目录归一化与去重
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// 解析并去重扫描根目录
/// - 尝试解析符号链接：成功且目标存在时，用解析结果作为去重键与遍历目标
/// - 解析失败（例如路径不存在）时退回原始路径，同样参与去重
/// - 保留首次出现的顺序，后续重复项静默丢弃
/// - 不存在的根目录不在此处报错，交给遍历阶段走正常的遍历错误通道
pub fn resolve_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut resolved = Vec::with_capacity(roots.len());
    let mut seen: HashSet<PathBuf> = HashSet::with_capacity(roots.len());

    for root in roots {
        // canonicalize 要求目标存在，成功即意味着解析结果在磁盘上可见
        let key = match fs::canonicalize(root) {
            Ok(real) if real.exists() => real,
            _ => root.clone(),
        };
        if seen.insert(key.clone()) {
            resolved.push(key);
        } else {
            tracing::debug!(root = %root.display(), "duplicate scan root dropped");
        }
    }

    resolved
}
