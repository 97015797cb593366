//! 照片文件存储服务
//!
//! 保存上传的原图并生成缩略图，删除时一并清理

use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops::FilterType, ImageFormat};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::utils::error::{AppError, AppResult};
use crate::utils::sanitize::sanitize_stored_filename;

/// 支持的内容类型及其扩展名
pub const SUPPORTED_CONTENT_TYPES: &[(&str, &str)] = &[("image/jpeg", "jpg"), ("image/png", "png")];

/// 根据内容类型获取扩展名
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    SUPPORTED_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| ct.eq_ignore_ascii_case(content_type))
        .map(|(_, ext)| *ext)
}

/// 根据扩展名获取内容类型
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    let ext = extension.to_lowercase();
    let ext = if ext == "jpeg" { "jpg" } else { ext.as_str() };
    SUPPORTED_CONTENT_TYPES
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(ct, _)| *ct)
}

/// 文件存储协作方
pub trait PhotoStorage: Send + Sync {
    /// 保存文件内容，返回生成的存储文件名
    fn store(&self, content: &[u8], original_name: &str, content_type: &str) -> AppResult<String>;

    /// 删除存储文件（文件不存在不算错误）
    fn remove(&self, filename: &str) -> AppResult<()>;
}

/// 基于本地文件系统的存储
pub struct FileStorage {
    uploads_dir: PathBuf,
    thumbnails_dir: PathBuf,
    /// 缩略图最大边长，None 表示不生成缩略图
    thumbnail_size: Option<u32>,
}

impl FileStorage {
    /// 创建存储服务
    pub fn new(uploads_dir: PathBuf, thumbnails_dir: PathBuf, thumbnail_size: Option<u32>) -> AppResult<Self> {
        for dir in [&uploads_dir, &thumbnails_dir] {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
                tracing::info!("创建存储目录: {:?}", dir);
            }
        }

        Ok(Self {
            uploads_dir,
            thumbnails_dir,
            thumbnail_size,
        })
    }

    /// 原图路径
    pub fn photo_path(&self, filename: &str) -> PathBuf {
        self.uploads_dir.join(sanitize_stored_filename(filename))
    }

    /// 缩略图路径（与原图同名）
    pub fn thumbnail_path(&self, filename: &str) -> PathBuf {
        self.thumbnails_dir.join(sanitize_stored_filename(filename))
    }

    /// 生成存储文件名：内容哈希与纳秒时间戳混合
    fn generate_filename(content: &[u8], extension: &str) -> String {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
        format!("{:016x}.{}", xxh3_64_with_seed(content, nanos), extension)
    }

    fn write_thumbnail(&self, content: &[u8], path: &Path, format: ImageFormat, size: u32) -> AppResult<()> {
        let img = image::load_from_memory_with_format(content, format)?;
        let thumbnail = img.resize(size, size, FilterType::Lanczos3);
        // JPEG 不支持透明通道
        let thumbnail = if format == ImageFormat::Jpeg {
            image::DynamicImage::ImageRgb8(thumbnail.to_rgb8())
        } else {
            thumbnail
        };
        thumbnail.save_with_format(path, format)?;
        Ok(())
    }

    fn remove_if_exists(path: &Path) -> AppResult<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!("删除文件: {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

impl PhotoStorage for FileStorage {
    fn store(&self, content: &[u8], original_name: &str, content_type: &str) -> AppResult<String> {
        let extension = extension_for(content_type).ok_or_else(|| {
            AppError::UnsupportedFormat(format!("{} ({})", content_type, original_name))
        })?;

        let filename = Self::generate_filename(content, extension);
        let photo_path = self.photo_path(&filename);
        fs::write(&photo_path, content)?;

        if let Some(size) = self.thumbnail_size {
            let format = if extension == "png" { ImageFormat::Png } else { ImageFormat::Jpeg };
            if let Err(e) = self.write_thumbnail(content, &self.thumbnail_path(&filename), format, size) {
                let _ = fs::remove_file(&photo_path);
                return Err(e);
            }
        }

        tracing::debug!("保存照片: {} -> {}", original_name, filename);
        Ok(filename)
    }

    fn remove(&self, filename: &str) -> AppResult<()> {
        Self::remove_if_exists(&self.photo_path(filename))?;
        Self::remove_if_exists(&self.thumbnail_path(filename))?;
        Ok(())
    }
}
