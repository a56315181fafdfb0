//! 扫描主流程与并行调度
//!
//! 线程与队列布局：
//! - 每个根目录一个遍历线程 → 路径队列（有界，workers*4）
//! - 固定 `workers` 个探测线程（Rayon 线程池）→ 结果队列（workers*2）/ 告警队列（workers）
//! - 结果、告警各一个消费线程
//!
//! 关闭顺序：遍历线程全部结束后路径队列才关闭（每个遍历线程持有一个发送端，最后一个发送端丢弃即关闭）；
//! 探测线程全部退出后才丢弃结果/告警发送端；消费者只在各自队列关闭后才被 join。
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;

use crossbeam_channel::{self as channel, Receiver, Sender};
use tracing::{debug, info};

use crate::error::{ConfigError, ScanError, WalkError};
use crate::options::{
    error_queue_capacity, match_queue_capacity, path_queue_capacity, validate_workers, ScanOptions, ScanStats,
};
use crate::output::{stream_matches, write_warnings};
use crate::probe::probe_header;
use crate::types::{MatchRecord, Probe, ScanOutcome};
use crate::walk::walk_root;

/// 扫描多个根目录，把命中送入 `matches`，把非权限类单文件错误送入 `errs`
///
/// 两个发送端在所有探测线程退出后才被丢弃，消费者据此判断队列已耗尽。
/// 返回汇总的根目录遍历错误（全部成功时为 None）；配置错误在任何线程启动前返回。
pub fn scan_paths(
    roots: &[PathBuf],
    workers: usize,
    matches: Sender<MatchRecord>,
    errs: Sender<ScanError>,
) -> Result<Option<WalkError>, ConfigError> {
    let pool = build_pool(workers)?;
    Ok(run_pipeline(roots, &pool, workers, matches, errs))
}

/// 流式扫描：结果按 `opts.output` 格式写入 `out`，告警写入 `diag`
///
/// 阻塞直到所有输出都已写出并 flush；遍历错误记录在返回的 `ScanStats::walk_error` 中。
pub fn scan_and_write(
    roots: &[PathBuf],
    out: &mut (dyn Write + Send),
    diag: &mut (dyn Write + Send),
    opts: &ScanOptions,
) -> Result<ScanStats> {
    // 配置校验与线程池构建都在产生任何输出之前完成
    opts.validate()?;
    let pool = build_pool(opts.workers)?;

    let (match_tx, match_rx) = channel::bounded::<MatchRecord>(match_queue_capacity(opts.workers));
    let (err_tx, err_rx) = channel::bounded::<ScanError>(error_queue_capacity(opts.workers));
    let (mode, show_size) = (opts.output, opts.show_size);

    let (written, warnings, walk_error) = thread::scope(|s| {
        let printer = s.spawn(move || stream_matches(match_rx, out, mode, show_size));
        let warner = s.spawn(move || write_warnings(err_rx, diag));

        // run_pipeline 返回时结果/告警发送端均已丢弃，两个消费者随即结束
        let walk_error = run_pipeline(roots, &pool, opts.workers, match_tx, err_tx);

        let written = printer.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        let warnings = warner.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        (written, warnings, walk_error)
    });

    let matches_written = written.context("write scan results")?;
    info!(matches_written, warnings, walk_failures = walk_error.as_ref().map_or(0, WalkError::len), "scan finished");

    Ok(ScanStats { matches_written, warnings, walk_error })
}

/// 非流式扫描：收集全部命中与告警后一次性返回（测试与库调用方使用）
pub fn find_sqlite_files(roots: &[PathBuf], workers: usize) -> Result<ScanOutcome> {
    let pool = build_pool(workers)?;

    let (match_tx, match_rx) = channel::bounded::<MatchRecord>(match_queue_capacity(workers));
    let (err_tx, err_rx) = channel::bounded::<ScanError>(error_queue_capacity(workers));

    let outcome = thread::scope(|s| {
        let collector = s.spawn(move || match_rx.iter().collect::<Vec<_>>());
        let drainer = s.spawn(move || err_rx.iter().collect::<Vec<_>>());

        let walk_error = run_pipeline(roots, &pool, workers, match_tx, err_tx);

        ScanOutcome {
            matches: collector.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
            warnings: drainer.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
            walk_error,
        }
    });

    Ok(outcome)
}

fn build_pool(workers: usize) -> Result<rayon::ThreadPool, ConfigError> {
    validate_workers(workers)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("probe-{i}"))
        .build()?;
    Ok(pool)
}

/// 协调者：启动遍历线程与探测线程，并按依赖顺序关闭各队列
fn run_pipeline(
    roots: &[PathBuf],
    pool: &rayon::ThreadPool,
    workers: usize,
    matches: Sender<MatchRecord>,
    errs: Sender<ScanError>,
) -> Option<WalkError> {
    let (path_tx, path_rx) = channel::bounded::<PathBuf>(path_queue_capacity(workers));
    // 唯一的共享可变状态：遍历错误累加器，只在 push 期间持锁
    let walk_error = Mutex::new(WalkError::default());

    thread::scope(|s| {
        for root in roots {
            let path_tx = path_tx.clone();
            let walk_error = &walk_error;
            // 每个遍历线程持有自己的发送端，线程结束即丢弃
            s.spawn(move || walk_one(root, &path_tx, walk_error));
        }
        // 协调者自身不生产路径；丢弃原始发送端后，最后一个遍历线程结束即关闭路径队列
        drop(path_tx);

        pool.scope(|ps| {
            for _ in 0..workers {
                let paths = path_rx.clone();
                let matches = matches.clone();
                let errs = errs.clone();
                ps.spawn(move |_| probe_worker(paths, matches, errs));
            }
            // 只有探测线程持有接收端：若它们全部提前退出，遍历线程的 send 会立即失败而不是永久阻塞
            drop(path_rx);
        });
        debug!("all probe workers finished");
    });

    // 探测线程已全部退出，此时关闭结果/告警队列
    drop(matches);
    drop(errs);

    walk_error.into_inner().unwrap_or_else(PoisonError::into_inner).into_option()
}

fn walk_one(root: &Path, paths: &Sender<PathBuf>, walk_error: &Mutex<WalkError>) {
    match walk_root(root, paths) {
        Ok(files) => debug!(root = %root.display(), files, "walk finished"),
        Err(err) => {
            debug!(root = %root.display(), error = %err, "walk aborted");
            walk_error.lock().unwrap_or_else(PoisonError::into_inner).push(err);
        }
    }
}

/// 单个探测线程：循环取路径直到路径队列关闭且耗尽
fn probe_worker(paths: Receiver<PathBuf>, matches: Sender<MatchRecord>, errs: Sender<ScanError>) {
    for path in paths {
        let res = probe_header(&path);
        route_probe(path, res, &matches, &errs);
    }
}

/// 分发单个文件的探测结果
/// - 命中 → 结果队列；不命中 → 忽略
/// - 权限不足 → 静默丢弃；其余错误 → 告警队列（附带路径）
/// - 消费者已退出时 send 失败，直接丢弃
fn route_probe(
    path: PathBuf,
    res: std::io::Result<Probe>,
    matches: &Sender<MatchRecord>,
    errs: &Sender<ScanError>,
) {
    match res {
        Ok(Probe::Match(m)) => { let _ = matches.send(m); }
        Ok(Probe::NoMatch) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {}
        Err(e) => { let _ = errs.send(ScanError::probe(path, e)); }
    }
}
