//! 命令行命令模块
//!
//! 手写参数解析，目前只有 `import` 一个子命令

pub mod import;

use thiserror::Error;

pub use import::ImportArgs;

/// 用法说明
pub const USAGE: &str = "用法:
  photoshare import --user <email> --dir <path> [--json]
  photoshare help";

/// 命令行错误
#[derive(Debug, Error)]
pub enum CliError {
    /// 参数错误，退出码 2
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => 2,
        }
    }
}

/// 解析出的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Import(ImportArgs),
    Help,
}

/// 解析命令行参数（不含程序名）
pub fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let Some((name, rest)) = args.split_first() else {
        return Err(CliError::usage("缺少命令"));
    };

    match name.as_str() {
        "import" => Ok(Command::Import(ImportArgs::parse(rest)?)),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(CliError::usage(format!("未知命令: {}", other))),
    }
}

/// 读取选项后面的值
pub(crate) fn next_value(args: &[String], idx: &mut usize, flag: &str) -> Result<String, CliError> {
    if *idx >= args.len() {
        return Err(CliError::usage(format!("{} 需要一个值", flag)));
    }
    let value = args[*idx].clone();
    *idx += 1;
    Ok(value)
}
