//! 标签数据模型

use serde::{Deserialize, Serialize};

/// 标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// 标签ID
    #[serde(rename = "id")]
    pub tag_id: i64,
    /// 标签名（小写，唯一）
    #[serde(rename = "name")]
    pub tag_name: String,
}

/// 标签统计（由存储层视图计算，只读）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCount {
    pub name: String,
    /// 示例照片的存储文件名
    pub photo: String,
    pub num_photos: i64,
}

/// 规范化标签列表：去除首尾空白、丢弃空串、转小写、去重
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let name = tag.trim().to_lowercase();
        if !name.is_empty() && !normalized.contains(&name) {
            normalized.push(name);
        }
    }
    normalized
}
