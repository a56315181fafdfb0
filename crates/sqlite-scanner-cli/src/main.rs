use anyhow::Result;
use clap::Parser;
use sqlite_scanner_core::{resolve_roots, scan_and_write, OutputMode, ScanOptions};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

const AFTER_HELP: &str = "\
Examples:
  sqlite-scanner
  sqlite-scanner /tmp
  sqlite-scanner /tmp ~
  sqlite-scanner --workers 16 /tmp
  sqlite-scanner --json

Notes:
  - Matches files with header bytes: \"SQLite format 3\\x00\".
  - Permission-denied paths are skipped.
  - Worker pool is controlled by `--workers`.
  - Output is streamed as entries are discovered.
  - Use --jsonl (with --size) to emit newline-delimited JSON objects.";

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(
    name = "sqlite-scanner",
    version,
    about = "Recursively find SQLite database files by checking file magic bytes.",
    long_about = "Recursively find SQLite database files by checking file magic bytes.\n\
                  Detection does not rely on file extensions and accepts positional paths.",
    after_help = AFTER_HELP
)]
struct Cli {
    /// directories to scan (falls back to --path when omitted)
    paths: Vec<PathBuf>,

    /// directory to scan
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// number of parallel workers
    #[arg(long, default_value_t = num_cpus_default(), allow_negative_numbers = true)]
    workers: i64,

    /// print matches as a JSON object with an entries array
    #[arg(long)]
    json: bool,

    /// emit newline-delimited JSON objects
    #[arg(long)]
    jsonl: bool,

    /// include the file size (bytes) in the output
    #[arg(long)]
    size: bool,
}

fn main() -> Result<ExitCode> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    // 位置参数优先；都没有时退回 --path（默认当前目录）
    let requested = if cli.paths.is_empty() { vec![cli.path.clone()] } else { cli.paths.clone() };
    let roots = resolve_roots(&requested);
    debug!(?roots, "resolved scan roots");

    // workers ≤ 0 属于配置错误：不启动流水线、不产生任何输出
    let workers = match usize::try_from(cli.workers) {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("workers must be > 0");
            return Ok(ExitCode::from(2));
        }
    };
    let opts = ScanOptions { workers, output: output_mode(&cli), show_size: cli.size };

    info!(roots = roots.len(), workers, output = ?opts.output, "starting scan");
    let mut out = io::stdout();
    let mut diag = io::stderr();
    let stats = scan_and_write(&roots, &mut out, &mut diag, &opts)?;

    // 遍历错误只做最终提示，已输出的命中依然有效
    if let Some(walk_error) = &stats.walk_error {
        eprintln!("scan completed with walk error: {walk_error}");
    }
    info!(matches = stats.matches_written, warnings = stats.warnings, "done");

    Ok(ExitCode::SUCCESS)
}

/// --jsonl 优先于 --json
fn output_mode(cli: &Cli) -> OutputMode {
    if cli.jsonl { OutputMode::JsonLines } else if cli.json { OutputMode::Json } else { OutputMode::Plain }
}

fn num_cpus_default() -> i64 {
    i64::try_from(ScanOptions::default().workers).unwrap_or(1)
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写 stderr，避免污染 stdout 上的结果流；默认只显示 warn 及以上
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
