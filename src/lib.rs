//! PhotoShare - 照片分享目录与标签引擎
//!
//! 命令行入口：初始化设置、日志和数据库后分发子命令

pub mod commands;
pub mod logging;

use std::sync::Arc;

use photoshare_core::{DefaultPathProvider, PathProvider, PhotoshareCore, SettingsManager};

use commands::{Command, USAGE};

/// 运行命令行（`args` 不含程序名）
pub fn run(args: &[String]) -> anyhow::Result<()> {
    let command = commands::parse_args(args)?;

    let import_args = match command {
        Command::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Command::Import(import_args) => import_args,
    };

    let path_provider = Arc::new(DefaultPathProvider::new());
    let settings = SettingsManager::new(path_provider.as_ref())?.load()?;

    // 初始化日志系统
    let _log_guard = logging::init_logging(&settings, &path_provider.logs_dir())?;

    tracing::info!("PhotoShare 启动中...");
    tracing::info!("数据库路径: {:?}", path_provider.database_path());

    let core = PhotoshareCore::new(path_provider, &settings)?;
    tracing::info!("数据库初始化完成");

    let report = commands::import::execute(&core, &settings, &import_args)?;
    println!("{}", commands::import::render(&report, import_args.json)?);

    Ok(())
}
