use crate::entitys::group_entity::{GroupRecord, NewGroup};
use crate::entitys::private_key::PrivateKey;
use async_trait::async_trait;
use common::errors::AppError;

/// 组队记录存储
///
/// 鉴权条件（id + 私钥）由存储在同一次原子操作里判断，
/// 更新额外比较 `revision`，避免基于过期读取的写入。
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// 分配 id 与创建时间后写入，返回完整记录（含私钥）
    async fn create(&self, data: NewGroup, private_key: PrivateKey) -> Result<GroupRecord, AppError>;

    /// 按创建时间倒序
    async fn list(&self) -> Result<Vec<GroupRecord>, AppError>;

    async fn find_by_id_and_secret(&self, id: &str, private_key: &str) -> Result<Option<GroupRecord>, AppError>;

    /// `current` 的 id、私钥、revision 仍匹配时写入 `next`，否则返回 None
    async fn update(&self, current: &GroupRecord, next: GroupRecord) -> Result<Option<GroupRecord>, AppError>;

    /// id 与私钥同时匹配才删除
    async fn delete(&self, id: &str, private_key: &str) -> Result<bool, AppError>;

    async fn count(&self) -> Result<u64, AppError>;

    fn kind(&self) -> &'static str;
}
