//! 照片目录服务
//!
//! 照片的增删改查、分页列表、关键词搜索和标签同步。
//! 每个操作都是一次同步的完整工作单元，删除后的文件清理交给后台队列。

use std::sync::Arc;

use crate::db::photo_dao::{delete_photo_row, insert_photo_row};
use crate::db::tag_dao::{clear_photo_tags, replace_photo_tags};
use crate::db::{Database, SearchQuery};
use crate::models::photo::now_utc;
use crate::models::tag::normalize_tags;
use crate::models::{
    page_offset, Identity, Photo, PhotoDetail, PhotoList, PhotoOrder, TagCount, PAGE_SIZE,
};
use crate::utils::error::AppResult;

use super::cleanup::CleanupQueue;
use super::storage::PhotoStorage;

/// 照片目录
pub struct PhotoCatalog {
    db: Arc<Database>,
    cleanup: CleanupQueue,
}

impl PhotoCatalog {
    pub fn new(db: Arc<Database>, storage: Arc<dyn PhotoStorage>) -> Self {
        Self {
            db,
            cleanup: CleanupQueue::new(storage),
        }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// 插入照片及其标签（单个事务）
    ///
    /// 成功后 `photo` 上会写回新 ID、创建时间和规范化后的标签。
    pub fn insert(&self, photo: &mut Photo) -> AppResult<()> {
        let tags = normalize_tags(&photo.tags);
        let mut row = photo.clone();
        row.created_at = now_utc();

        let photo_id = self.db.transaction(|conn| {
            let photo_id = insert_photo_row(conn, &row)?;
            replace_photo_tags(conn, photo_id, &tags)?;
            Ok(photo_id)
        })?;

        photo.photo_id = photo_id;
        photo.created_at = row.created_at;
        photo.tags = tags;

        tracing::info!("新增照片 {} ({}), {} 个标签", photo_id, photo.filename, photo.tags.len());
        Ok(())
    }

    /// 更新标题和票数，不修改标签
    pub fn update(&self, photo: &Photo) -> AppResult<bool> {
        self.db.update_photo(photo)
    }

    /// 删除照片，提交成功后异步清理存储文件
    ///
    /// 只按 `photo_id` 定位；清理的是被删除行记录的文件，与 `photo.filename` 无关。
    pub fn delete(&self, photo: &Photo) -> AppResult<bool> {
        let photo_id = photo.photo_id;
        let removed = self.db.transaction(|conn| delete_photo_row(conn, photo_id))?;

        match removed {
            Some(filename) => {
                tracing::info!("删除照片 {} ({})", photo_id, filename);
                self.cleanup.submit(filename);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 按 ID 获取照片
    pub fn get(&self, photo_id: i64) -> AppResult<Option<Photo>> {
        self.db.get_photo(photo_id)
    }

    /// 获取照片详情（上传者名称、标签和调用方权限）
    pub fn get_detail(&self, photo_id: i64, caller: Option<&dyn Identity>) -> AppResult<Option<PhotoDetail>> {
        let detail = self.db.get_photo_with_owner(photo_id)?.map(|(photo, owner_name)| {
            let permissions = photo.permissions(caller);
            PhotoDetail {
                photo,
                owner_name,
                permissions,
            }
        });

        Ok(detail)
    }

    /// 全部照片的一页，`order_by` 为 "votes" 时按得票排序，否则按时间
    pub fn all(&self, page_num: i64, order_by: &str) -> AppResult<PhotoList> {
        let order = PhotoOrder::from_param(order_by);
        let total = self.db.count_photos()?;
        let items = self.db.list_photos(order, PAGE_SIZE, page_offset(page_num))?;
        Ok(PhotoList::new(items, total, page_num))
    }

    /// 某个用户上传的照片的一页
    pub fn by_owner_id(&self, page_num: i64, owner_id: i64) -> AppResult<PhotoList> {
        let total = self.db.count_photos_by_owner(owner_id)?;
        let items = self
            .db
            .list_photos_by_owner(owner_id, PAGE_SIZE, page_offset(page_num))?;
        Ok(PhotoList::new(items, total, page_num))
    }

    /// 关键词搜索（所有关键词都须匹配标题、上传者名或标签之一）
    pub fn search(&self, page_num: i64, query: &str) -> AppResult<PhotoList> {
        let Some(query) = SearchQuery::parse(query) else {
            return Ok(PhotoList::empty(page_num));
        };

        let (items, total) = self
            .db
            .search_photos(&query, PAGE_SIZE, page_offset(page_num))?;
        Ok(PhotoList::new(items, total, page_num))
    }

    /// 各标签的照片数
    pub fn get_tag_counts(&self) -> AppResult<Vec<TagCount>> {
        self.db.get_tag_counts()
    }

    /// 让照片的已存标签与 `photo.tags` 完全一致
    pub fn update_tags(&self, photo: &Photo) -> AppResult<()> {
        let tags = normalize_tags(&photo.tags);
        let photo_id = photo.photo_id;

        if tags.is_empty() && photo_id != 0 {
            self.db.transaction(|conn| clear_photo_tags(conn, photo_id))?;
            return Ok(());
        }

        self.db.set_photo_tags(photo_id, &tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Anonymous, CreateUser, User};
    use crate::utils::error::AppError;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    /// 记录 remove 调用的存储替身
    struct RecordingStorage {
        removed: Mutex<mpsc::Sender<String>>,
    }

    impl PhotoStorage for RecordingStorage {
        fn store(&self, _content: &[u8], original_name: &str, _content_type: &str) -> AppResult<String> {
            Ok(original_name.to_string())
        }

        fn remove(&self, filename: &str) -> AppResult<()> {
            let _ = self.removed.lock().unwrap().send(filename.to_string());
            Ok(())
        }
    }

    struct Fixture {
        catalog: PhotoCatalog,
        removed: mpsc::Receiver<String>,
        dana: i64,
        sam: i64,
    }

    fn setup() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        let dana = db
            .create_user(&CreateUser {
                name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
                is_admin: false,
            })
            .unwrap();
        let sam = db
            .create_user(&CreateUser {
                name: "Sam".to_string(),
                email: "sam@example.com".to_string(),
                is_admin: false,
            })
            .unwrap();

        let (tx, rx) = mpsc::channel();
        let storage = Arc::new(RecordingStorage {
            removed: Mutex::new(tx),
        });

        Fixture {
            catalog: PhotoCatalog::new(Arc::new(db), storage),
            removed: rx,
            dana,
            sam,
        }
    }

    fn add_photo(catalog: &PhotoCatalog, owner_id: i64, title: &str, tags: &[&str]) -> Photo {
        let mut photo = Photo::new(
            owner_id,
            title.to_string(),
            format!("{}.jpg", title.to_lowercase().replace(' ', "_")),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        catalog.insert(&mut photo).unwrap();
        photo
    }

    fn stored_tags(catalog: &PhotoCatalog, photo_id: i64) -> Vec<String> {
        let mut tags = catalog.database().get_tag_names_for_photo(photo_id).unwrap();
        tags.sort();
        tags
    }

    fn titles(list: &PhotoList) -> Vec<&str> {
        list.items.iter().map(|p| p.title.as_str()).collect()
    }

    fn user(db: &Database, user_id: i64) -> User {
        db.get_user(user_id).unwrap().unwrap().authenticated()
    }

    #[test]
    fn test_insert_assigns_id_and_normalizes_tags() {
        let f = setup();
        let photo = add_photo(&f.catalog, f.dana, "Red Sunset", &[" Beach ", "", "SUNSET", "beach"]);

        assert!(photo.photo_id > 0);
        assert_eq!(photo.tags, vec!["beach", "sunset"]);
        assert_eq!(stored_tags(&f.catalog, photo.photo_id), vec!["beach", "sunset"]);

        let stored = f.catalog.get(photo.photo_id).unwrap().unwrap();
        assert_eq!(stored.created_at, photo.created_at);
    }

    #[test]
    fn test_insert_is_atomic_when_tag_step_fails() {
        let f = setup();
        f.catalog
            .database()
            .connection()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER fail_tags BEFORE INSERT ON tags WHEN NEW.tag_name = 'explode'
                 BEGIN SELECT RAISE(ABORT, 'simulated'); END;",
            )
            .unwrap();

        let mut photo = Photo::new(f.dana, "Boom".to_string(), "boom.jpg".to_string(), vec!["explode".to_string()]);
        let result = f.catalog.insert(&mut photo);

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(photo.photo_id, 0);
        assert_eq!(f.catalog.database().count_photos().unwrap(), 0);
        assert!(f.catalog.database().get_all_tags().unwrap().is_empty());
    }

    #[test]
    fn test_update_tags_is_idempotent() {
        let f = setup();
        let mut photo = add_photo(&f.catalog, f.dana, "Harbor", &["boats"]);

        photo.tags = vec!["Sea".to_string(), "boats".to_string()];
        f.catalog.update_tags(&photo).unwrap();
        let first = stored_tags(&f.catalog, photo.photo_id);

        f.catalog.update_tags(&photo).unwrap();
        assert_eq!(stored_tags(&f.catalog, photo.photo_id), first);
        assert_eq!(first, vec!["boats", "sea"]);
    }

    #[test]
    fn test_clearing_tags_leaves_other_photos_untouched() {
        let f = setup();
        let mut first = add_photo(&f.catalog, f.dana, "First", &["shared", "own"]);
        let second = add_photo(&f.catalog, f.sam, "Second", &["shared"]);

        first.tags = vec!["  ".to_string()];
        f.catalog.update_tags(&first).unwrap();

        assert!(stored_tags(&f.catalog, first.photo_id).is_empty());
        assert_eq!(stored_tags(&f.catalog, second.photo_id), vec!["shared"]);
    }

    #[test]
    fn test_update_keeps_tags() {
        let f = setup();
        let mut photo = add_photo(&f.catalog, f.dana, "Before", &["keep"]);

        photo.title = "After".to_string();
        photo.up_votes = 2;
        assert!(f.catalog.update(&photo).unwrap());

        let detail = f.catalog.get_detail(photo.photo_id, None).unwrap().unwrap();
        assert_eq!(detail.photo.title, "After");
        assert_eq!(detail.photo.up_votes, 2);
        assert_eq!(detail.photo.tags, vec!["keep"]);
    }

    #[test]
    fn test_delete_schedules_cleanup() {
        let f = setup();
        let photo = add_photo(&f.catalog, f.dana, "Gone", &["tmp"]);

        assert!(f.catalog.delete(&photo).unwrap());
        assert!(f.catalog.get(photo.photo_id).unwrap().is_none());
        assert_eq!(f.removed.recv_timeout(Duration::from_secs(5)).unwrap(), "gone.jpg");

        // 照片已不存在：不再调度清理
        assert!(!f.catalog.delete(&photo).unwrap());
        assert!(f.removed.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_delete_cleans_up_the_deleted_rows_file() {
        let f = setup();
        let first = add_photo(&f.catalog, f.dana, "a", &[]);
        let second = add_photo(&f.catalog, f.dana, "b", &[]);

        // 调用方持有的文件名与库中记录不一致
        let mut stale = first.clone();
        stale.filename = second.filename.clone();

        assert!(f.catalog.delete(&stale).unwrap());
        assert_eq!(f.removed.recv_timeout(Duration::from_secs(5)).unwrap(), "a.jpg");
        assert!(f.catalog.get(second.photo_id).unwrap().is_some());
        assert!(f.removed.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_get_detail_missing_photo() {
        let f = setup();
        assert!(f.catalog.get_detail(404, None).unwrap().is_none());
        assert!(f.catalog.get(404).unwrap().is_none());
    }

    #[test]
    fn test_get_detail_permissions() {
        let f = setup();
        let db = f.catalog.database().clone();
        let photo = add_photo(&f.catalog, f.dana, "Mine", &["x"]);

        let anonymous = f.catalog.get_detail(photo.photo_id, Some(&Anonymous)).unwrap().unwrap();
        assert_eq!(anonymous.owner_name, "Dana");
        assert_eq!(anonymous.permissions, Default::default());

        let owner = user(&db, f.dana);
        let detail = f.catalog.get_detail(photo.photo_id, Some(&owner)).unwrap().unwrap();
        assert!(detail.permissions.edit && detail.permissions.delete && !detail.permissions.vote);

        let other = user(&db, f.sam);
        let detail = f.catalog.get_detail(photo.photo_id, Some(&other)).unwrap().unwrap();
        assert!(!detail.permissions.edit && !detail.permissions.delete && detail.permissions.vote);

        db.register_vote(f.sam, photo.photo_id).unwrap();
        let other = user(&db, f.sam);
        let detail = f.catalog.get_detail(photo.photo_id, Some(&other)).unwrap().unwrap();
        assert!(!detail.permissions.vote);
    }

    #[test]
    fn test_search_empty_query() {
        let f = setup();
        add_photo(&f.catalog, f.dana, "Anything", &[]);

        for query in ["", "   "] {
            let result = f.catalog.search(1, query).unwrap();
            assert!(result.is_empty());
            assert_eq!(result.total, 0);
            assert_eq!(result.num_pages, 0);
        }
    }

    #[test]
    fn test_search_matches_title_owner_and_tags() {
        let f = setup();
        add_photo(&f.catalog, f.dana, "Red Sunset", &["beach"]);
        add_photo(&f.catalog, f.sam, "Blue Lake", &["mountain"]);

        let result = f.catalog.search(1, "red beach").unwrap();
        assert_eq!(titles(&result), vec!["Red Sunset"]);
        assert_eq!(result.total, 1);

        assert!(f.catalog.search(1, "red mountain").unwrap().is_empty());

        // 上传者名，不区分大小写
        assert_eq!(titles(&f.catalog.search(1, "DANA").unwrap()), vec!["Red Sunset"]);
        assert_eq!(titles(&f.catalog.search(1, "sam lake").unwrap()), vec!["Blue Lake"]);
    }

    #[test]
    fn test_search_photo_listed_once_with_many_matching_tags() {
        let f = setup();
        add_photo(&f.catalog, f.dana, "Tags", &["sea", "seaside", "seal"]);

        let result = f.catalog.search(1, "sea").unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn test_search_is_unicode_case_insensitive() {
        let f = setup();
        let zoe = f
            .catalog
            .database()
            .create_user(&CreateUser {
                name: "Zoë".to_string(),
                email: "zoe@example.com".to_string(),
                is_admin: false,
            })
            .unwrap();
        let photo = add_photo(&f.catalog, zoe, "Éclair Été", &["ÉTÉ"]);
        assert_eq!(photo.tags, vec!["été"]);

        for query in ["éclair", "ÉCLAIR", "Éclair", "ÉTÉ", "été", "ZOË", "zoë", "zoë ÉTÉ"] {
            let result = f.catalog.search(1, query).unwrap();
            assert_eq!(result.total, 1, "query {:?}", query);
            assert_eq!(titles(&result), vec!["Éclair Été"]);
        }
    }

    #[test]
    fn test_search_pagination() {
        let f = setup();
        let mut photos = Vec::new();
        for i in 0..14 {
            photos.push(add_photo(&f.catalog, f.dana, &format!("match {:02}", i), &[]));
        }
        add_photo(&f.catalog, f.sam, "other", &[]);

        photos[3].up_votes = 5;
        f.catalog.update(&photos[3]).unwrap();
        photos[7].up_votes = 3;
        photos[7].down_votes = 1;
        f.catalog.update(&photos[7]).unwrap();

        let page1 = f.catalog.search(1, "MATCH").unwrap();
        assert_eq!(page1.total, 14);
        assert_eq!(page1.num_pages, 2);
        assert_eq!(page1.items.len(), 12);
        assert_eq!(
            titles(&page1)[..5],
            ["match 03", "match 07", "match 13", "match 12", "match 11"]
        );

        let page2 = f.catalog.search(2, "MATCH").unwrap();
        assert_eq!(page2.total, 14);
        assert_eq!(page2.current_page, 2);
        assert_eq!(titles(&page2), vec!["match 01", "match 00"]);

        let beyond = f.catalog.search(3, "MATCH").unwrap();
        assert!(beyond.is_empty());
        assert_eq!(beyond.total, 14);
    }

    #[test]
    fn test_search_ignores_terms_after_sixth() {
        let f = setup();
        add_photo(&f.catalog, f.dana, "a b c d e f", &[]);

        let six = f.catalog.search(1, "a b c d e f").unwrap();
        let seven = f.catalog.search(1, "a b c d e f nomatch").unwrap();
        assert_eq!(six.total, 1);
        assert_eq!(titles(&seven), titles(&six));
        assert_eq!(seven.total, six.total);
    }

    #[test]
    fn test_all_ordering() {
        let f = setup();
        let mut first = add_photo(&f.catalog, f.dana, "first", &[]);
        add_photo(&f.catalog, f.dana, "second", &[]);
        let mut third = add_photo(&f.catalog, f.sam, "third", &[]);

        first.up_votes = 3;
        f.catalog.update(&first).unwrap();
        third.up_votes = 2;
        third.down_votes = 2;
        f.catalog.update(&third).unwrap();

        let newest = f.catalog.all(1, "").unwrap();
        assert_eq!(titles(&newest), vec!["third", "second", "first"]);

        let by_votes = f.catalog.all(1, "votes").unwrap();
        assert_eq!(titles(&by_votes), vec!["first", "third", "second"]);
        assert_eq!(by_votes.total, 3);
        assert_eq!(by_votes.num_pages, 1);
    }

    #[test]
    fn test_pagination() {
        let f = setup();
        for i in 0..13 {
            add_photo(&f.catalog, f.dana, &format!("photo {:02}", i), &[]);
        }

        let page1 = f.catalog.all(1, "").unwrap();
        assert_eq!(page1.items.len(), 12);
        assert_eq!(page1.total, 13);
        assert_eq!(page1.num_pages, 2);
        assert_eq!(page1.current_page, 1);

        let page2 = f.catalog.all(2, "").unwrap();
        assert_eq!(titles(&page2), vec!["photo 00"]);

        let beyond = f.catalog.all(5, "").unwrap();
        assert!(beyond.is_empty());
        assert_eq!(beyond.total, 13);
        assert_eq!(beyond.current_page, 5);

        // 非正页码按负偏移透传，SQLite 视为 0
        let zero = f.catalog.all(0, "").unwrap();
        assert_eq!(zero.items.len(), 12);
    }

    #[test]
    fn test_by_owner_id() {
        let f = setup();
        let mut liked = add_photo(&f.catalog, f.dana, "liked", &[]);
        add_photo(&f.catalog, f.dana, "recent", &[]);
        add_photo(&f.catalog, f.sam, "other", &[]);

        liked.up_votes = 1;
        f.catalog.update(&liked).unwrap();

        let result = f.catalog.by_owner_id(1, f.dana).unwrap();
        assert_eq!(titles(&result), vec!["liked", "recent"]);
        assert_eq!(result.total, 2);

        assert_eq!(f.catalog.by_owner_id(1, 999).unwrap().total, 0);
    }

    #[test]
    fn test_get_tag_counts() {
        let f = setup();
        add_photo(&f.catalog, f.dana, "one", &["beach", "sky"]);
        let newest = add_photo(&f.catalog, f.sam, "two", &["beach"]);

        let counts = f.catalog.get_tag_counts().unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].name, "beach");
        assert_eq!(counts[0].num_photos, 2);
        assert_eq!(counts[0].photo, newest.filename);
        assert_eq!(counts[1].name, "sky");
        assert_eq!(counts[1].num_photos, 1);
    }
}
