//! 日志初始化
//!
//! 控制台输出到 stderr；开启 `logToFile` 时另写按天滚动的日志文件

use std::path::Path;

use photoshare_core::AppSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 日志文件名前缀
const LOG_FILE_NAME: &str = "photoshare.log";

/// 由设置中的日志级别构建过滤器
pub fn filter_from_level(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志系统
///
/// 返回的 guard 必须在进程退出前一直持有，否则文件日志可能丢失。
pub fn init_logging(settings: &AppSettings, logs_dir: &Path) -> anyhow::Result<Option<WorkerGuard>> {
    // RUST_LOG 优先
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_from_level(&settings.log_level));

    let (file_layer, guard) = if settings.log_to_file {
        std::fs::create_dir_all(logs_dir)?;
        let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
