//! `import` 命令：把目录中的图片批量导入为某个用户的照片

use std::path::PathBuf;

use photoshare_core::{AppSettings, ImportReport, PhotoshareCore};

use super::{next_value, CliError};

/// import 命令参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportArgs {
    /// 照片所有者的邮箱
    pub user: String,
    /// 导入根目录
    pub dir: PathBuf,
    /// 以 JSON 输出导入结果
    pub json: bool,
}

impl ImportArgs {
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut user = None;
        let mut dir = None;
        let mut json = false;

        let mut idx = 0;
        while idx < args.len() {
            let flag = args[idx].as_str();
            idx += 1;
            match flag {
                "--user" | "-u" => user = Some(next_value(args, &mut idx, flag)?),
                "--dir" | "-d" => dir = Some(PathBuf::from(next_value(args, &mut idx, flag)?)),
                "--json" => json = true,
                other => return Err(CliError::usage(format!("未知选项: {}", other))),
            }
        }

        let user = user
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| CliError::usage("缺少 --user"))?;
        let dir = dir.ok_or_else(|| CliError::usage("缺少 --dir"))?;

        Ok(Self { user, dir, json })
    }
}

/// 执行导入
pub fn execute(core: &PhotoshareCore, settings: &AppSettings, args: &ImportArgs) -> anyhow::Result<ImportReport> {
    tracing::info!("导入目录 {:?}，用户 {}", args.dir, args.user);
    let report = core.importer(settings).import_dir(&args.user, &args.dir)?;
    Ok(report)
}

/// 输出导入结果
pub fn render(report: &ImportReport, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    Ok(format!(
        "导入完成: {} 个成功, {} 个跳过, {} 个失败",
        report.imported, report.skipped, report.failed
    ))
}
