//! 结果与告警的流式输出（消费者）
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;
use serde::Serialize;

use crate::error::ScanError;
use crate::options::OutputMode;
use crate::types::{MatchRecord, OutputItem};

/// 转为绝对路径（不解析符号链接）；失败时原样返回
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// 消费结果队列并按指定格式立即写出，返回写出的命中数
///
/// 除 Json 模式需要暂存恰好一条“待定”记录（用于判断其后是否需要逗号）外，不做任何缓冲；
/// 记录按到达顺序输出，不重排。
pub fn stream_matches(
    matches: Receiver<MatchRecord>,
    out: &mut dyn Write,
    mode: OutputMode,
    show_size: bool,
) -> io::Result<usize> {
    let mut written = 0usize;

    match mode {
        OutputMode::JsonLines => {
            for m in matches {
                write_json_line(out, &m, show_size)?;
                written += 1;
            }
        }
        OutputMode::Json => {
            writeln!(out, "{{")?;
            writeln!(out, "  \"entries\": [")?;
            // 先取一条作为待定项；收到下一条时才知道它后面要带逗号
            if let Ok(first) = matches.recv() {
                let mut pending = first;
                for next in matches {
                    writeln!(out, "{},", format_json_entry(&pending, show_size))?;
                    written += 1;
                    pending = next;
                }
                writeln!(out, "{}", format_json_entry(&pending, show_size))?;
                written += 1;
            }
            writeln!(out, "  ]")?;
            writeln!(out, "}}")?;
        }
        OutputMode::Plain => {
            for m in matches {
                writeln!(out, "{}", format_plain_match(&m, show_size))?;
                written += 1;
            }
        }
    }

    out.flush()?;
    Ok(written)
}

/// 消费告警队列，逐条写到诊断输出；写失败也继续消费，永不阻断流水线
///
/// 返回值是收到的告警条数（含写出失败的条目），写失败只记 debug 日志。
pub fn write_warnings(errs: Receiver<ScanError>, diag: &mut dyn Write) -> usize {
    let mut received = 0usize;
    for err in errs {
        received += 1;
        if let Err(e) = writeln!(diag, "warning: {err}") {
            tracing::debug!(path = %err.path().display(), error = %e, "failed to write warning");
        }
    }
    if let Err(e) = diag.flush() {
        tracing::debug!(error = %e, "failed to flush diagnostics");
    }
    received
}

fn display_path(path: &Path) -> String {
    absolute_path(path).to_string_lossy().into_owned()
}

fn json_string(s: String) -> String {
    serde_json::Value::String(s).to_string()
}

/// 单行 JSON 格式：冒号与逗号后各留一个空格，即 `{"path": "...", "size": N}`
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }
}

fn write_json_line(out: &mut dyn Write, m: &MatchRecord, show_size: bool) -> io::Result<()> {
    let path = display_path(&m.path);
    let item = OutputItem { path: &path, size: show_size.then_some(m.size) };
    let mut ser = serde_json::Serializer::with_formatter(&mut *out, SpacedFormatter);
    item.serialize(&mut ser)?;
    writeln!(out)
}

fn format_json_entry(m: &MatchRecord, show_size: bool) -> String {
    let path = json_string(display_path(&m.path));
    if show_size {
        format!("    {{\n      \"path\": {path},\n      \"size\": {}\n    }}", m.size)
    } else {
        format!("    {{\n      \"path\": {path}\n    }}")
    }
}

fn format_plain_match(m: &MatchRecord, show_size: bool) -> String {
    let path = display_path(&m.path);
    if !show_size { return path; }
    format!("{path} ({} bytes)", m.size)
}
