use crate::entitys::group_entity::{GroupRecord, NewGroup};
use crate::entitys::private_key::PrivateKey;
use crate::manager::group_store::GroupStore;
use async_trait::async_trait;
use common::errors::AppError;
use common::util::common_utils::build_id;
use common::util::date_util::now_millis;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};

struct StoredGroup {
    record: GroupRecord,
    // 同一毫秒内创建时的排序依据
    seq: u64,
}

/// 内存存储，本地开发与测试使用
///
/// DashMap 的分片锁保证同一条记录的"检查 + 修改"是原子的。
#[derive(Default)]
pub struct MemoryGroupStore {
    groups: DashMap<String, StoredGroup>,
    seq: AtomicU64,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn create(&self, data: NewGroup, private_key: PrivateKey) -> Result<GroupRecord, AppError> {
        let create_time = now_millis();
        loop {
            match self.groups.entry(build_id()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let record = GroupRecord::new(slot.key().clone(), data, private_key, create_time);
                    record.validate()?;
                    let seq = self.seq.fetch_add(1, Ordering::SeqCst);
                    slot.insert(StoredGroup { record: record.clone(), seq });
                    return Ok(record);
                }
            }
        }
    }

    async fn list(&self) -> Result<Vec<GroupRecord>, AppError> {
        let mut all: Vec<(i64, u64, GroupRecord)> =
            self.groups.iter().map(|g| (g.record.create_time, g.seq, g.record.clone())).collect();
        all.sort_by_key(|(time, seq, _)| Reverse((*time, *seq)));
        Ok(all.into_iter().map(|(_, _, record)| record).collect())
    }

    async fn find_by_id_and_secret(&self, id: &str, private_key: &str) -> Result<Option<GroupRecord>, AppError> {
        Ok(self.groups.get(id).filter(|g| g.record.private_key.matches(private_key)).map(|g| g.record.clone()))
    }

    async fn update(&self, current: &GroupRecord, mut next: GroupRecord) -> Result<Option<GroupRecord>, AppError> {
        next.validate()?;
        let Some(mut stored) = self.groups.get_mut(&current.id) else {
            return Ok(None);
        };
        if stored.record.private_key != current.private_key || stored.record.revision != current.revision {
            return Ok(None);
        }
        next.id = current.id.clone();
        next.private_key = current.private_key.clone();
        next.create_time = current.create_time;
        next.revision = current.revision + 1;
        stored.record = next.clone();
        Ok(Some(next))
    }

    async fn delete(&self, id: &str, private_key: &str) -> Result<bool, AppError> {
        Ok(self.groups.remove_if(id, |_, g| g.record.private_key.matches(private_key)).is_some())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.groups.len() as u64)
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitys::group_entity::{GameMap, Job};
    use crate::entitys::private_key::PRIVATE_KEY_BYTES;

    fn new_group(level: i64) -> NewGroup {
        NewGroup {
            job: Job::DragonKnight,
            level,
            maps: vec![GameMap::DT],
            available_times: vec!["MON_20".parse().unwrap()],
            game_id: format!("player{}", level),
            discord_id: None,
        }
    }

    fn key(b: u8) -> PrivateKey {
        PrivateKey::from_bytes(&[b; PRIVATE_KEY_BYTES])
    }

    #[tokio::test]
    async fn create_assigns_unique_ids() {
        let store = MemoryGroupStore::new();
        let a = store.create(new_group(80), key(1)).await.unwrap();
        let b = store.create(new_group(81), key(2)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.revision, 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn create_rejects_invalid_record() {
        let store = MemoryGroupStore::new();
        assert!(store.create(new_group(10), key(1)).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_newest_first() {
        let store = MemoryGroupStore::new();
        let first = store.create(new_group(80), key(1)).await.unwrap();
        let second = store.create(new_group(90), key(2)).await.unwrap();
        let third = store.create(new_group(75), key(3)).await.unwrap();
        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn find_requires_both_id_and_key() {
        let store = MemoryGroupStore::new();
        let rec = store.create(new_group(80), key(1)).await.unwrap();
        assert!(store.find_by_id_and_secret(&rec.id, rec.private_key.as_str()).await.unwrap().is_some());
        assert!(store.find_by_id_and_secret(&rec.id, key(2).as_str()).await.unwrap().is_none());
        assert!(store.find_by_id_and_secret("missing", rec.private_key.as_str()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let store = MemoryGroupStore::new();
        let rec = store.create(new_group(80), key(1)).await.unwrap();

        let mut next = rec.clone();
        next.level = 85;
        let updated = store.update(&rec, next).await.unwrap().unwrap();
        assert_eq!(updated.revision, 1);

        // 基于旧 revision 的写入失败
        let mut stale = rec.clone();
        stale.level = 99;
        assert!(store.update(&rec, stale).await.unwrap().is_none());
        let current = store.find_by_id_and_secret(&rec.id, rec.private_key.as_str()).await.unwrap().unwrap();
        assert_eq!(current.level, 85);
    }

    #[tokio::test]
    async fn update_cannot_change_identity() {
        let store = MemoryGroupStore::new();
        let rec = store.create(new_group(80), key(1)).await.unwrap();
        let mut next = rec.clone();
        next.id = "other".to_string();
        next.private_key = key(9);
        next.create_time = 0;
        let updated = store.update(&rec, next).await.unwrap().unwrap();
        assert_eq!(updated.id, rec.id);
        assert_eq!(updated.private_key, rec.private_key);
        assert_eq!(updated.create_time, rec.create_time);
    }

    #[tokio::test]
    async fn delete_with_wrong_key_keeps_record() {
        let store = MemoryGroupStore::new();
        let rec = store.create(new_group(80), key(1)).await.unwrap();
        assert!(!store.delete(&rec.id, key(2).as_str()).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.delete(&rec.id, rec.private_key.as_str()).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!store.delete(&rec.id, rec.private_key.as_str()).await.unwrap());
    }
}
