use crate::entitys::group_entity::{GroupRecord, NewGroup};
use crate::entitys::private_key::PrivateKey;
use crate::manager::group_store::GroupStore;
use async_trait::async_trait;
use common::errors::AppError;
use common::repository_util::{BaseRepository, Repository};
use common::util::common_utils::build_id;
use common::util::date_util::now_millis;
use log::info;
use mongodb::Database;
use mongodb::bson::doc;

/// MongoDB 存储，文档 `_id` 即记录 id
pub struct MongoGroupStore {
    pub dao: BaseRepository<GroupRecord>,
}

impl MongoGroupStore {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self { dao: BaseRepository::new(db.collection(collection)) }
    }

    /// 列表按 create_time 倒序
    pub async fn init_indexes(&self) -> Result<(), AppError> {
        self.dao.ensure_index(doc! { "create_time": -1 }, "idx_create_time").await?;
        info!("✅ 索引就绪: idx_create_time");
        Ok(())
    }
}

#[async_trait]
impl GroupStore for MongoGroupStore {
    async fn create(&self, data: NewGroup, private_key: PrivateKey) -> Result<GroupRecord, AppError> {
        let record = GroupRecord::new(build_id(), data, private_key, now_millis());
        record.validate()?;
        // 单文档写入，要么完整写入要么失败
        self.dao.insert(&record).await?;
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<GroupRecord>, AppError> {
        let list = self.dao.query_sorted(doc! {}, doc! { "create_time": -1, "_id": -1 }).await?;
        Ok(list)
    }

    async fn find_by_id_and_secret(&self, id: &str, private_key: &str) -> Result<Option<GroupRecord>, AppError> {
        let found = self.dao.find_one(doc! { "_id": id, "private_key": private_key }).await?;
        Ok(found)
    }

    async fn update(&self, current: &GroupRecord, mut next: GroupRecord) -> Result<Option<GroupRecord>, AppError> {
        next.validate()?;
        next.id = current.id.clone();
        next.private_key = current.private_key.clone();
        next.create_time = current.create_time;
        next.revision = current.revision + 1;
        let filter = doc! {
            "_id": current.id.as_str(),
            "private_key": current.private_key.as_str(),
            "revision": current.revision,
        };
        let updated = self.dao.replace_one(filter, &next).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str, private_key: &str) -> Result<bool, AppError> {
        let deleted = self.dao.delete_one(doc! { "_id": id, "private_key": private_key }).await?;
        Ok(deleted > 0)
    }

    async fn count(&self) -> Result<u64, AppError> {
        let count = self.dao.count(doc! {}).await?;
        Ok(count)
    }

    fn kind(&self) -> &'static str {
        "mongo"
    }
}
