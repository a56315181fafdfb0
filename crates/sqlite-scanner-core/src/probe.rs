//! 文件头魔数探测（无状态，可被多个探测线程并发调用）
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::types::{MatchRecord, Probe};

/// SQLite 3 文件头：`"SQLite format 3"` + 1 个 NUL，共 16 字节
pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// 探测单个文件
/// - 读取恰好 16 字节并与魔数逐字节比较（偏移 0，大小写敏感）
/// - 文件不足 16 字节：确定性的不命中，不视为错误
/// - 打开/读取失败，或命中后 stat 失败：返回错误，由调用方附加路径
/// - 文件句柄随 `File` 析构释放，任何返回路径都不会泄漏
pub fn probe_header(path: &Path) -> io::Result<Probe> {
    let mut file = File::open(path)?;

    let mut header = [0u8; SQLITE_MAGIC.len()];
    match file.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(Probe::NoMatch),
        Err(e) => return Err(e),
    }
    if &header != SQLITE_MAGIC { return Ok(Probe::NoMatch); }

    let size = file.metadata()?.len();
    Ok(Probe::Match(MatchRecord { path: path.to_path_buf(), size }))
}
