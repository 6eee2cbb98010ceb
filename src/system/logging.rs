//! 日志系统初始化
//!
//! 按配置装配 tracing 订阅器：级别过滤、text/json 输出、
//! 可选的按天滚动日志文件。写入走 non-blocking appender，
//! 返回的 guard 必须存活到进程结束，否则会丢掉末尾的日志。

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, StaticConfig};

/// 初始化日志系统，进程生命周期内只能调用一次
///
/// # Panics
/// 日志文件/滚动目录无法创建，或全局订阅器已被注册时 panic——
/// 这两种情况都发生在启动阶段，直接失败比静默丢日志好。
pub fn init_logging(config: &StaticConfig) -> WorkerGuard {
    let to_file = config
        .logging
        .file
        .as_deref()
        .is_some_and(|f| !f.is_empty());
    let (writer, guard) = tracing_appender::non_blocking(make_writer(&config.logging));

    let builder = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(EnvFilter::new(config.logging.level.clone()))
        .with_level(true)
        // 文件里不要 ANSI 转义
        .with_ansi(!to_file);

    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    guard
}

/// 按配置构造底层 writer：滚动文件、普通追加文件或 stdout
fn make_writer(logging: &LoggingConfig) -> Box<dyn std::io::Write + Send + Sync> {
    let log_file = match logging.file.as_deref() {
        Some(path) if !path.is_empty() => path,
        _ => return Box::new(std::io::stdout()),
    };

    let path = std::path::Path::new(log_file);
    if logging.enable_rotation {
        let dir = path.parent().unwrap_or(std::path::Path::new("."));
        let stem = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("vidgate.log")
            .trim_end_matches(".log");
        let appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(stem)
            .filename_suffix("log")
            .max_log_files(logging.max_backups as usize)
            .build(dir)
            .expect("Failed to create rolling log appender");
        Box::new(appender)
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .expect("Failed to open log file");
        Box::new(file)
    }
}
