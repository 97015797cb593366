//! 多关键词搜索查询构建器
//!
//! 每个关键词生成一个子查询，在标题、上传者名称、标签名上做不区分大小写的
//! 子串匹配（字段之间为 OR），所有子查询再用 INTERSECT 求交（关键词之间为 AND）。
//! 大小写按 Unicode 规则处理：关键词在 Rust 中转小写，列值经 `LOWER_FN` 转小写。
//! 关键词只以编号参数绑定，不拼接进 SQL。

/// 最多参与搜索的关键词数量，多余的静默丢弃
pub const MAX_SEARCH_TERMS: usize = 6;

/// 单个关键词的匹配子查询，`{n}` 为参数编号
const TERM_CLAUSE: &str = r#"SELECT DISTINCT p.photo_id, p.owner_id, p.created_at, p.title, p.filename, p.up_votes, p.down_votes
FROM photos p
INNER JOIN users u ON u.user_id = p.owner_id
LEFT JOIN photo_tags pt ON pt.photo_id = p.photo_id
LEFT JOIN tags t ON t.tag_id = pt.tag_id
WHERE photoshare_lower(p.title) LIKE ?{n} OR photoshare_lower(u.name) LIKE ?{n} OR photoshare_lower(t.tag_name) LIKE ?{n}"#;

/// 解析后的搜索查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    /// 按空白切分查询串，丢弃空词并截取前 6 个；没有关键词时返回 None
    pub fn parse(query: &str) -> Option<Self> {
        let terms: Vec<String> = query
            .split_whitespace()
            .take(MAX_SEARCH_TERMS)
            .map(str::to_string)
            .collect();

        if terms.is_empty() {
            None
        } else {
            Some(Self { terms })
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// 绑定参数：关键词转小写后两侧加通配符
    pub fn patterns(&self) -> Vec<String> {
        self.terms.iter().map(|term| format!("%{}%", term.to_lowercase())).collect()
    }

    /// 所有关键词子查询的交集
    fn intersection_sql(&self) -> String {
        (1..=self.terms.len())
            .map(|n| TERM_CLAUSE.replace("{n}", &n.to_string()))
            .collect::<Vec<_>>()
            .join("\nINTERSECT\n")
    }

    /// 统计交集大小
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM ({}) q", self.intersection_sql())
    }

    /// 查询一页结果，LIMIT/OFFSET 使用关键词之后的两个参数编号
    pub fn page_sql(&self) -> String {
        let n = self.terms.len();
        format!(
            "SELECT * FROM ({}) q ORDER BY (up_votes - down_votes) DESC, created_at DESC, photo_id DESC LIMIT ?{} OFFSET ?{}",
            self.intersection_sql(),
            n + 1,
            n + 2
        )
    }
}
