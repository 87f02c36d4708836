use crate::entitys::private_key::PrivateKey;
use crate::entitys::time_slot::{TimeSlot, format_available_times};
use common::errors::ValidationFailed;
use common::util::date_util::millis_to_rfc3339;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// 目前开放的最低等级
pub const MIN_LEVEL: i64 = 70;
/// 游戏 ID / Discord ID 最大字符数
pub const MAX_HANDLE_CHARS: usize = 50;

/// 职业
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display, ToSchema)]
pub enum Job {
    #[serde(rename = "龍騎士", alias = "DRAGON_KNIGHT")]
    #[strum(to_string = "龍騎士", serialize = "DRAGON_KNIGHT")]
    DragonKnight,
    #[serde(rename = "祭司", alias = "PRIEST")]
    #[strum(to_string = "祭司", serialize = "PRIEST")]
    Priest,
}

/// 地图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display, ToSchema)]
pub enum GameMap {
    DT,
    PW,
    CD,
}

/// 校验通过的新建数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub job: Job,
    pub level: i64,
    pub maps: Vec<GameMap>,
    pub available_times: Vec<TimeSlot>,
    pub game_id: String,
    pub discord_id: Option<String>,
}

/// 部分更新，未提供的字段保持不变
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPatch {
    pub job: Option<Job>,
    pub level: Option<i64>,
    pub maps: Option<Vec<GameMap>>,
    pub available_times: Option<Vec<TimeSlot>>,
    pub game_id: Option<String>,
    // Some(None) 表示清除
    pub discord_id: Option<Option<String>>,
}

impl GroupPatch {
    pub fn is_empty(&self) -> bool {
        *self == GroupPatch::default()
    }

    /// 生成更新后的记录，不改变 id、私钥、创建时间
    pub fn apply(&self, record: &GroupRecord) -> GroupRecord {
        let mut next = record.clone();
        if let Some(job) = self.job {
            next.job = job;
        }
        if let Some(level) = self.level {
            next.level = level;
        }
        if let Some(maps) = &self.maps {
            next.maps = maps.clone();
        }
        if let Some(times) = &self.available_times {
            next.available_times = times.clone();
        }
        if let Some(game_id) = &self.game_id {
            next.game_id = game_id.clone();
        }
        if let Some(discord_id) = &self.discord_id {
            next.discord_id = discord_id.clone();
        }
        next
    }
}

/// 组队记录（MongoDB 文档）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub job: Job,
    pub level: i64,
    pub maps: Vec<GameMap>,
    pub available_times: Vec<TimeSlot>,
    pub game_id: String,
    pub discord_id: Option<String>,
    pub private_key: PrivateKey,
    /// 创建时间（Unix 毫秒）
    pub create_time: i64,
    /// 每次更新 +1，用于并发更新的比较交换
    pub revision: i64,
}

impl GroupRecord {
    pub fn new(id: String, data: NewGroup, private_key: PrivateKey, create_time: i64) -> Self {
        Self {
            id,
            job: data.job,
            level: data.level,
            maps: data.maps,
            available_times: data.available_times,
            game_id: data.game_id,
            discord_id: data.discord_id,
            private_key,
            create_time,
            revision: 0,
        }
    }

    /// 记录不变量检查，写入前调用
    pub fn validate(&self) -> Result<(), ValidationFailed> {
        let mut failed = ValidationFailed::new();
        if self.level < MIN_LEVEL {
            failed.add("level", "目前開放的最低等級是 70 等");
        }
        if self.maps.is_empty() {
            failed.add("maps", "請選擇地圖");
        }
        if self.available_times.is_empty() {
            failed.add("availableTimes", "請至少選擇一個可遊戲時間");
        }
        let game_id_chars = self.game_id.chars().count();
        if game_id_chars == 0 || game_id_chars > MAX_HANDLE_CHARS {
            failed.add("gameId", "遊戲 ID 長度需為 1 到 50 個字");
        }
        if self.discord_id.as_ref().is_some_and(|d| d.chars().count() > MAX_HANDLE_CHARS) {
            failed.add("discordId", "Discord ID 不可超過 50 個字");
        }
        failed.finish(())
    }
}

/// 对外返回的组队记录，私钥只在创建时返回一次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: String,
    pub job: Job,
    pub level: i64,
    pub maps: Vec<GameMap>,
    #[schema(value_type = Vec<String>, example = json!(["MON_20", "MON_21"]))]
    pub available_times: Vec<TimeSlot>,
    /// 时段摘要，如 `一: 20:00-22:00`
    pub times_summary: String,
    pub game_id: String,
    pub discord_id: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl GroupView {
    /// 仅用于创建接口的响应
    pub fn with_private_key(record: &GroupRecord) -> Self {
        let mut view = Self::from(record);
        view.private_key = Some(record.private_key.as_str().to_string());
        view
    }
}

impl From<&GroupRecord> for GroupView {
    fn from(record: &GroupRecord) -> Self {
        Self {
            id: record.id.clone(),
            job: record.job,
            level: record.level,
            maps: record.maps.clone(),
            available_times: record.available_times.clone(),
            times_summary: format_available_times(&record.available_times),
            game_id: record.game_id.clone(),
            discord_id: record.discord_id.clone(),
            created_at: millis_to_rfc3339(record.create_time),
            private_key: None,
        }
    }
}
