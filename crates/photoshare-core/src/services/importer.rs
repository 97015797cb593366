//! 批量导入服务
//!
//! 遍历目录导入图片：子目录名作为标签，文件名（不含扩展名）作为标题

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::models::{ImportSettings, Photo};
use crate::utils::error::{AppError, AppResult};

use super::catalog::PhotoCatalog;
use super::storage::{content_type_for, PhotoStorage};

/// 导入结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    /// 扩展名不在允许列表中的文件
    pub skipped: usize,
    pub failed: usize,
}

/// 批量导入器
pub struct Importer {
    catalog: Arc<PhotoCatalog>,
    storage: Arc<dyn PhotoStorage>,
    settings: ImportSettings,
}

impl Importer {
    pub fn new(catalog: Arc<PhotoCatalog>, storage: Arc<dyn PhotoStorage>, settings: ImportSettings) -> Self {
        Self {
            catalog,
            storage,
            settings,
        }
    }

    /// 以 `owner_email` 对应用户的身份导入 `dir` 下的所有图片
    pub fn import_dir(&self, owner_email: &str, dir: &Path) -> AppResult<ImportReport> {
        let owner = self
            .catalog
            .database()
            .get_user_by_email(owner_email)?
            .ok_or_else(|| AppError::NotFound(format!("用户 {}", owner_email)))?;

        if !dir.is_dir() {
            return Err(AppError::InvalidPath(dir.display().to_string()));
        }

        tracing::info!("开始导入: {:?} (用户 {})", dir, owner.email);

        let mut report = ImportReport::default();
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("遍历错误: {}", e);
                    report.failed += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(content_type) = self.content_type(path) else {
                tracing::debug!("跳过文件: {:?}", path);
                report.skipped += 1;
                continue;
            };

            match self.import_file(owner.user_id, dir, path, content_type) {
                Ok(photo) => {
                    tracing::debug!("导入 {:?} -> 照片 {}", path, photo.photo_id);
                    report.imported += 1;
                }
                Err(e) => {
                    tracing::warn!("导入失败 {:?}: {}", path, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "导入完成: {} 个成功, {} 个跳过, {} 个失败",
            report.imported,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    /// 允许导入时返回内容类型
    fn content_type(&self, path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if !self.settings.allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)) {
            return None;
        }
        content_type_for(&ext)
    }

    fn import_file(&self, owner_id: i64, root: &Path, path: &Path, content_type: &str) -> AppResult<Photo> {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let original_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let content = fs::read(path)?;
        let filename = self.storage.store(&content, &original_name, content_type)?;

        let mut photo = Photo::new(owner_id, title, filename, tags_from_path(root, path));
        if let Err(e) = self.catalog.insert(&mut photo) {
            let _ = self.storage.remove(&photo.filename);
            return Err(e);
        }

        Ok(photo)
    }
}

/// 相对于导入根目录的各级子目录名
fn tags_from_path(root: &Path, path: &Path) -> Vec<String> {
    path.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|relative| {
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::CreateUser;
    use crate::services::storage::FileStorage;
    use image::DynamicImage;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        source: std::path::PathBuf,
        catalog: Arc<PhotoCatalog>,
        importer: Importer,
    }

    fn setup() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source");
        fs::create_dir_all(&source).unwrap();

        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db.create_user(&CreateUser {
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            is_admin: false,
        })
        .unwrap();

        let uploads = tmp.path().join("uploads");
        let storage: Arc<dyn PhotoStorage> =
            Arc::new(FileStorage::new(uploads.clone(), uploads.join("thumbnails"), Some(32)).unwrap());
        let catalog = Arc::new(PhotoCatalog::new(Arc::new(db), storage.clone()));
        let importer = Importer::new(catalog.clone(), storage, ImportSettings::default());

        Fixture {
            _tmp: tmp,
            source,
            catalog,
            importer,
        }
    }

    fn write_image(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        DynamicImage::new_rgb8(64, 48).save(path).unwrap();
    }

    #[test]
    fn test_tags_from_path() {
        let root = Path::new("/photos");
        assert_eq!(
            tags_from_path(root, Path::new("/photos/Travel/Beach/sun.jpg")),
            vec!["Travel", "Beach"]
        );
        assert!(tags_from_path(root, Path::new("/photos/sun.jpg")).is_empty());
    }

    #[test]
    fn test_import_dir() {
        let f = setup();
        write_image(&f.source.join("Travel").join("Beach").join("Sunset.png"));
        write_image(&f.source.join("Portrait.jpg"));
        fs::write(f.source.join("notes.txt"), "ignore me").unwrap();
        fs::write(f.source.join("Travel").join("broken.jpg"), "not a jpeg").unwrap();

        let report = f.importer.import_dir("Dana@Example.com", &f.source).unwrap();
        assert_eq!(
            report,
            ImportReport {
                imported: 2,
                skipped: 1,
                failed: 1,
            }
        );

        let result = f.catalog.search(1, "sunset").unwrap();
        assert_eq!(result.total, 1);
        let detail = f
            .catalog
            .get_detail(result.items[0].photo_id, None)
            .unwrap()
            .unwrap();
        assert_eq!(detail.photo.title, "Sunset");
        assert_eq!(detail.photo.tags, vec!["beach", "travel"]);
        assert_eq!(detail.owner_name, "Dana");

        let portrait = f.catalog.search(1, "portrait").unwrap();
        assert_eq!(portrait.total, 1);
        assert!(portrait.items[0].filename.ends_with(".jpg"));
    }

    #[test]
    fn test_import_skips_hidden_dirs() {
        let f = setup();
        write_image(&f.source.join(".cache").join("hidden.png"));

        let report = f.importer.import_dir("dana@example.com", &f.source).unwrap();
        assert_eq!(report, ImportReport::default());
    }

    #[test]
    fn test_import_unknown_user() {
        let f = setup();
        let result = f.importer.import_dir("nobody@example.com", &f.source);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_import_missing_dir() {
        let f = setup();
        let result = f.importer.import_dir("dana@example.com", &f.source.join("missing"));
        assert!(matches!(result, Err(AppError::InvalidPath(_))));
    }
}
