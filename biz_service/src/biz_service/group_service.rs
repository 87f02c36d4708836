use crate::biz_service::group_filter::{GroupFilter, filter_groups};
use crate::dto::group_dto::{CreateGroupDto, DeleteGroupDto, UpdateGroupDto};
use crate::entitys::group_entity::{GroupRecord, GroupView};
use crate::manager::group_store::GroupStore;
use crate::manager::secret_manager::SecretSource;
use common::errors::AppError;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

/// 并发更新冲突时的最大尝试次数
pub const MAX_UPDATE_ATTEMPTS: usize = 3;

/// 存储状态
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoreStatus {
    #[schema(example = "mongo")]
    pub store: String,
    pub count: u64,
}

pub struct GroupService {
    store: Arc<dyn GroupStore>,
    secrets: Arc<dyn SecretSource>,
}

impl GroupService {
    pub fn new(store: Arc<dyn GroupStore>, secrets: Arc<dyn SecretSource>) -> Self {
        Self { store, secrets }
    }

    /// 校验通过后生成私钥并写入，私钥只在这里返回
    pub async fn create(&self, body: &Value) -> Result<GroupView, AppError> {
        let data = CreateGroupDto::parse(body)?;
        let private_key = self.secrets.issue()?;
        let record = self.store.create(data, private_key).await?;
        info!("✅ 组队已创建: id={}", record.id);
        Ok(GroupView::with_private_key(&record))
    }

    /// 全部记录按创建时间倒序，再按筛选条件过滤
    pub async fn list(&self, filter: &GroupFilter) -> Result<Vec<GroupView>, AppError> {
        let groups: Vec<GroupView> = self.store.list().await?.iter().map(GroupView::from).collect();
        Ok(filter_groups(groups, filter))
    }

    /// 顺序：私钥必填 -> 鉴权 -> 补丁校验 -> 合并写入
    pub async fn update(&self, id: &str, body: &Value) -> Result<GroupView, AppError> {
        let (private_key, patch) = UpdateGroupDto::parse(body)?;
        let mut current = self.authorize(id, &private_key).await?;
        let patch = patch?;

        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let next = patch.apply(&current);
            if next == current {
                return Ok(GroupView::from(&current));
            }
            next.validate()?;
            if let Some(updated) = self.store.update(&current, next).await? {
                info!("✅ 组队已更新: id={}", id);
                return Ok(GroupView::from(&updated));
            }
            warn!("⚠️ 组队并发更新冲突: id={}, attempt={}", id, attempt);
            // 期间被删除时返回 NotFound
            current = self.authorize(id, &private_key).await?;
        }
        Err(AppError::Conflict)
    }

    pub async fn delete(&self, id: &str, body: Option<&Value>) -> Result<(), AppError> {
        let private_key = DeleteGroupDto::private_key(body).ok_or(AppError::MissingPrivateKey)?;
        if !self.store.delete(id, &private_key).await? {
            return Err(AppError::NotFound);
        }
        info!("🗑️ 组队已删除: id={}", id);
        Ok(())
    }

    pub async fn status(&self) -> Result<StoreStatus, AppError> {
        let count = self.store.count().await?;
        Ok(StoreStatus { store: self.store.kind().to_string(), count })
    }

    // id 不存在与私钥错误返回同一个错误
    async fn authorize(&self, id: &str, private_key: &str) -> Result<GroupRecord, AppError> {
        self.store.find_by_id_and_secret(id, private_key).await?.ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitys::group_entity::{GameMap, Job, NewGroup};
    use crate::entitys::private_key::{PRIVATE_KEY_BYTES, PrivateKey};
    use crate::manager::group_store_memory_impl::MemoryGroupStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

    struct SeqSecrets(AtomicU8);

    impl SecretSource for SeqSecrets {
        fn issue(&self) -> Result<PrivateKey, AppError> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(PrivateKey::from_bytes(&[n; PRIVATE_KEY_BYTES]))
        }
    }

    struct BrokenSecrets;

    impl SecretSource for BrokenSecrets {
        fn issue(&self) -> Result<PrivateKey, AppError> {
            Err(AppError::Internal("rng unavailable".into()))
        }
    }

    /// 前 `conflicts` 次更新模拟被其他请求抢先
    struct ContendedStore {
        inner: MemoryGroupStore,
        conflicts: AtomicUsize,
    }

    #[async_trait]
    impl GroupStore for ContendedStore {
        async fn create(&self, data: NewGroup, private_key: PrivateKey) -> Result<GroupRecord, AppError> {
            self.inner.create(data, private_key).await
        }
        async fn list(&self) -> Result<Vec<GroupRecord>, AppError> {
            self.inner.list().await
        }
        async fn find_by_id_and_secret(&self, id: &str, private_key: &str) -> Result<Option<GroupRecord>, AppError> {
            self.inner.find_by_id_and_secret(id, private_key).await
        }
        async fn update(&self, current: &GroupRecord, next: GroupRecord) -> Result<Option<GroupRecord>, AppError> {
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                return Ok(None);
            }
            self.inner.update(current, next).await
        }
        async fn delete(&self, id: &str, private_key: &str) -> Result<bool, AppError> {
            self.inner.delete(id, private_key).await
        }
        async fn count(&self) -> Result<u64, AppError> {
            self.inner.count().await
        }
        fn kind(&self) -> &'static str {
            "contended"
        }
    }

    fn service() -> GroupService {
        GroupService::new(Arc::new(MemoryGroupStore::new()), Arc::new(SeqSecrets(AtomicU8::new(0))))
    }

    fn contended(conflicts: usize) -> GroupService {
        let store = ContendedStore { inner: MemoryGroupStore::new(), conflicts: AtomicUsize::new(conflicts) };
        GroupService::new(Arc::new(store), Arc::new(SeqSecrets(AtomicU8::new(0))))
    }

    fn dragon_knight() -> Value {
        json!({
            "job": "龍騎士",
            "level": 85,
            "maps": ["DT"],
            "availableTimes": ["MON_20", "MON_21"],
            "gameId": "DragonKnight123"
        })
    }

    #[tokio::test]
    async fn create_returns_key_once() {
        let svc = service();
        let created = svc.create(&dragon_knight()).await.unwrap();
        let key = created.private_key.clone().unwrap();
        assert_eq!(key, "01".repeat(32));
        assert_eq!(created.maps, vec![GameMap::DT]);

        let listed = svc.list(&GroupFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].private_key.is_none());
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let svc = service();
        let mut body = dragon_knight();
        body["level"] = json!(65);
        let err = svc.create(&body).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f.contains("level")));
        assert_eq!(svc.status().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn secret_failure_persists_nothing() {
        let svc = GroupService::new(Arc::new(MemoryGroupStore::new()), Arc::new(BrokenSecrets));
        let err = svc.create(&dragon_knight()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(svc.status().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered() {
        let svc = service();
        let first = svc.create(&dragon_knight()).await.unwrap();
        let second = svc
            .create(&json!({
                "job": "祭司",
                "level": 78,
                "maps": ["PW", "CD"],
                "availableTimes": ["TUE_19"],
                "gameId": "Priest456"
            }))
            .await
            .unwrap();
        let all = svc.list(&GroupFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|g| g.id.clone()).collect::<Vec<_>>(), vec![second.id.clone(), first.id.clone()]);

        let filter = GroupFilter { job: Some(Job::DragonKnight), ..Default::default() };
        let only = svc.list(&filter).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, first.id);
    }

    #[tokio::test]
    async fn update_requires_matching_key() {
        let svc = service();
        let created = svc.create(&dragon_knight()).await.unwrap();
        let wrong = json!({"privateKey": "ff".repeat(32), "level": 90});
        assert!(matches!(svc.update(&created.id, &wrong).await, Err(AppError::NotFound)));
        assert!(matches!(svc.update("missing", &wrong).await, Err(AppError::NotFound)));

        let key = created.private_key.unwrap();
        let updated = svc.update(&created.id, &json!({"privateKey": key, "level": 90})).await.unwrap();
        assert_eq!(updated.level, 90);
        assert_eq!(updated.game_id, "DragonKnight123");
        assert!(updated.private_key.is_none());
    }

    #[tokio::test]
    async fn authorization_precedes_patch_validation() {
        let svc = service();
        let created = svc.create(&dragon_knight()).await.unwrap();
        // 私钥错误时不暴露补丁的校验结果
        let wrong = json!({"privateKey": "ff".repeat(32), "level": 10});
        assert!(matches!(svc.update(&created.id, &wrong).await, Err(AppError::NotFound)));

        let key = created.private_key.unwrap();
        let err = svc.update(&created.id, &json!({"privateKey": key, "level": 10})).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f.contains("level")));
    }

    #[tokio::test]
    async fn update_without_key_is_rejected() {
        let svc = service();
        let created = svc.create(&dragon_knight()).await.unwrap();
        let err = svc.update(&created.id, &json!({"level": 90})).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f.contains("privateKey")));
    }

    #[tokio::test]
    async fn empty_patch_is_idempotent() {
        let svc = service();
        let created = svc.create(&dragon_knight()).await.unwrap();
        let key = created.private_key.clone().unwrap();
        let same = svc.update(&created.id, &json!({"privateKey": key})).await.unwrap();
        assert_eq!(same.level, created.level);
        assert_eq!(same.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_retries_after_conflict() {
        let svc = contended(2);
        let created = svc.create(&dragon_knight()).await.unwrap();
        let key = created.private_key.unwrap();
        let updated = svc.update(&created.id, &json!({"privateKey": key, "maps": ["CD"]})).await.unwrap();
        assert_eq!(updated.maps, vec![GameMap::CD]);
    }

    #[tokio::test]
    async fn update_gives_up_after_max_attempts() {
        let svc = contended(MAX_UPDATE_ATTEMPTS);
        let created = svc.create(&dragon_knight()).await.unwrap();
        let key = created.private_key.unwrap();
        let err = svc.update(&created.id, &json!({"privateKey": key, "level": 88})).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict));
    }

    #[tokio::test]
    async fn delete_flow() {
        let svc = service();
        let created = svc.create(&dragon_knight()).await.unwrap();
        assert!(matches!(svc.delete(&created.id, None).await, Err(AppError::MissingPrivateKey)));
        assert!(matches!(svc.delete(&created.id, Some(&json!({"privateKey": ""}))).await, Err(AppError::MissingPrivateKey)));
        let wrong = json!({"privateKey": "ff".repeat(32)});
        assert!(matches!(svc.delete(&created.id, Some(&wrong)).await, Err(AppError::NotFound)));

        let key = json!({"privateKey": created.private_key.unwrap()});
        svc.delete(&created.id, Some(&key)).await.unwrap();
        assert!(matches!(svc.delete(&created.id, Some(&key)).await, Err(AppError::NotFound)));
        assert_eq!(svc.status().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn status_reports_store_kind() {
        let svc = service();
        svc.create(&dragon_knight()).await.unwrap();
        let status = svc.status().await.unwrap();
        assert_eq!(status.store, "memory");
        assert_eq!(status.count, 1);
    }
}
