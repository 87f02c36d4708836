use crate::dto::payload::Payload;
use crate::entitys::group_entity::{GameMap, GroupPatch, Job, NewGroup};
use crate::entitys::time_slot::TimeSlot;
use chrono::TimeDelta;
use common::errors::ValidationFailed;
use common::util::date_util::parse_rfc3339;
use common::util::validate::message_error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

const JOB_MESSAGE: &str = "請選擇職業";
const MAP_MESSAGE: &str = "請選擇地圖";
const TIMES_MESSAGE: &str = "請至少選擇一個可遊戲時間";
const SLOT_MESSAGE: &str = "時段格式錯誤，應為 MON_20 形式";
const PRIVATE_KEY_MESSAGE: &str = "私鑰是必需的";

/// 创建组队请求体
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateGroupDto {
    /// 职业：龍騎士 / 祭司
    #[schema(example = "龍騎士")]
    #[validate(required(message = "請選擇職業"), custom(function = "validate_job"))]
    pub job: Option<String>,

    /// 等级，最低 70
    #[schema(example = 85)]
    #[validate(required(message = "請輸入數字"), range(min = 70, message = "目前開放的最低等級是 70 等"))]
    pub level: Option<i64>,

    /// 地图（可多选）：DT / PW / CD
    #[schema(example = json!(["DT"]))]
    #[validate(length(min = 1, message = "請選擇地圖"), custom(function = "validate_maps"))]
    pub maps: Option<Vec<String>>,

    /// 旧版单一地图，提供 maps 时忽略
    pub map: Option<String>,

    /// 每周可游戏时段
    #[serde(rename = "availableTimes")]
    #[schema(example = json!(["MON_20", "MON_21"]))]
    #[validate(length(min = 1, message = "請至少選擇一個可遊戲時間"), custom(function = "validate_time_slots"))]
    pub available_times: Option<Vec<String>>,

    #[serde(rename = "gameId")]
    #[schema(example = "DragonKnight123")]
    #[validate(required(message = "請輸入遊戲 ID"), length(min = 1, max = 50, message = "遊戲 ID 長度需為 1 到 50 個字"))]
    pub game_id: Option<String>,

    #[serde(rename = "discordId")]
    #[validate(length(max = 50, message = "Discord ID 不可超過 50 個字"))]
    pub discord_id: Option<String>,

    /// 旧版绝对时间（RFC 3339），换算为每周时段
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
}

impl CreateGroupDto {
    /// 校验创建请求，返回全部字段错误
    pub fn parse(body: &Value) -> Result<NewGroup, ValidationFailed> {
        let mut payload = Payload::new(body)?;
        let dto = Self {
            job: payload.read("job", JOB_MESSAGE),
            level: payload.read("level", "請輸入數字"),
            maps: payload.read("maps", MAP_MESSAGE),
            map: payload.read("map", MAP_MESSAGE),
            available_times: payload.read("availableTimes", TIMES_MESSAGE),
            game_id: payload.read("gameId", "請輸入遊戲 ID"),
            discord_id: payload.read("discordId", "Discord ID 必須是文字"),
            start_time: payload.read("startTime", "開始時間格式錯誤"),
            end_time: payload.read("endTime", "結束時間格式錯誤"),
        };
        let mut errors = payload.into_errors();
        if let Err(e) = dto.validate() {
            errors.merge(&e);
        }
        validate_legacy_map(&dto.maps, &dto.map, &mut errors);

        let legacy = legacy_slots(dto.start_time.as_deref(), dto.end_time.as_deref(), &mut errors);
        if dto.maps.is_none() && dto.map.is_none() {
            errors.add("maps", MAP_MESSAGE);
        }
        if dto.available_times.is_none() && dto.start_time.is_none() && dto.end_time.is_none() {
            errors.add("availableTimes", TIMES_MESSAGE);
        }

        let job = convert(&mut errors, "job", dto.job.as_deref().map(parse_job));
        let maps = convert(&mut errors, "maps", map_list(&dto.maps, &dto.map).map(parse_maps));
        let available_times = match dto.available_times.as_deref() {
            Some(list) => convert(&mut errors, "availableTimes", Some(parse_time_slots(list))),
            None => legacy,
        };

        match (job, dto.level, maps, available_times, dto.game_id) {
            (Some(job), Some(level), Some(maps), Some(available_times), Some(game_id)) => errors.finish(NewGroup {
                job,
                level,
                maps,
                available_times,
                game_id,
                discord_id: dto.discord_id.and_then(non_empty),
            }),
            _ => {
                if errors.is_empty() {
                    errors.add("body", "請求內容不完整");
                }
                Err(errors)
            }
        }
    }
}

/// 更新组队请求体，除私钥外均为可选
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateGroupDto {
    /// 创建时返回的私钥
    #[serde(rename = "privateKey")]
    #[validate(required(message = "私鑰是必需的"), length(min = 1, message = "私鑰是必需的"))]
    pub private_key: Option<String>,

    #[validate(custom(function = "validate_job"))]
    pub job: Option<String>,

    #[validate(range(min = 70, message = "目前開放的最低等級是 70 等"))]
    pub level: Option<i64>,

    #[validate(length(min = 1, message = "請選擇地圖"), custom(function = "validate_maps"))]
    pub maps: Option<Vec<String>>,

    pub map: Option<String>,

    #[serde(rename = "availableTimes")]
    #[validate(length(min = 1, message = "請至少選擇一個可遊戲時間"), custom(function = "validate_time_slots"))]
    pub available_times: Option<Vec<String>>,

    #[serde(rename = "gameId")]
    #[validate(length(min = 1, max = 50, message = "遊戲 ID 長度需為 1 到 50 個字"))]
    pub game_id: Option<String>,

    /// 传 null 或空字符串清除
    #[serde(rename = "discordId")]
    #[validate(length(max = 50, message = "Discord ID 不可超過 50 個字"))]
    pub discord_id: Option<String>,

    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,

    #[serde(skip)]
    pub clear_discord_id: bool,
}

/// 私钥与补丁分开校验：私钥缺失直接失败，补丁错误在鉴权之后才返回
pub type ParsedUpdate = (String, Result<GroupPatch, ValidationFailed>);

impl UpdateGroupDto {
    pub fn parse(body: &Value) -> Result<ParsedUpdate, ValidationFailed> {
        let mut payload = Payload::new(body)?;
        let discord = payload.read_nullable::<String>("discordId", "Discord ID 必須是文字");
        let dto = Self {
            private_key: payload.read("privateKey", PRIVATE_KEY_MESSAGE),
            job: payload.read("job", JOB_MESSAGE),
            level: payload.read("level", "請輸入數字"),
            maps: payload.read("maps", MAP_MESSAGE),
            map: payload.read("map", MAP_MESSAGE),
            available_times: payload.read("availableTimes", TIMES_MESSAGE),
            game_id: payload.read("gameId", "請輸入遊戲 ID"),
            discord_id: discord.clone().flatten().and_then(non_empty),
            start_time: payload.read("startTime", "開始時間格式錯誤"),
            end_time: payload.read("endTime", "結束時間格式錯誤"),
            clear_discord_id: matches!(discord, Some(None)) || matches!(&discord, Some(Some(d)) if d.trim().is_empty()),
        };
        let mut errors = payload.into_errors();
        if let Err(e) = dto.validate() {
            errors.merge(&e);
        }
        validate_legacy_map(&dto.maps, &dto.map, &mut errors);

        let Some(private_key) = dto.private_key.clone().filter(|k| !k.is_empty()) else {
            errors.add("privateKey", PRIVATE_KEY_MESSAGE);
            return Err(errors);
        };

        let legacy = legacy_slots(dto.start_time.as_deref(), dto.end_time.as_deref(), &mut errors);
        let job = convert(&mut errors, "job", dto.job.as_deref().map(parse_job));
        let maps = convert(&mut errors, "maps", map_list(&dto.maps, &dto.map).map(parse_maps));
        let available_times = match dto.available_times.as_deref() {
            Some(list) => convert(&mut errors, "availableTimes", Some(parse_time_slots(list))),
            None => legacy,
        };
        let discord_id = if dto.clear_discord_id { Some(None) } else { dto.discord_id.map(Some) };

        let patch = GroupPatch { job, level: dto.level, maps, available_times, game_id: dto.game_id, discord_id };
        Ok((private_key, errors.finish(patch)))
    }
}

/// 删除组队请求体
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct DeleteGroupDto {
    #[serde(rename = "privateKey")]
    pub private_key: Option<String>,
}

impl DeleteGroupDto {
    /// 请求体缺失、不是对象或私钥为空时返回 None
    pub fn private_key(body: Option<&Value>) -> Option<String> {
        body?.get("privateKey")?.as_str().filter(|k| !k.is_empty()).map(str::to_string)
    }
}

fn validate_job(value: &str) -> Result<(), ValidationError> {
    parse_job(value).map(|_| ())
}

fn validate_maps(values: &[String]) -> Result<(), ValidationError> {
    parse_maps(values).map(|_| ())
}

// 同时提供 maps 时不检查 map
fn validate_legacy_map(maps: &Option<Vec<String>>, map: &Option<String>, errors: &mut ValidationFailed) {
    if maps.is_some() {
        return;
    }
    if map.as_deref().is_some_and(|m| GameMap::from_str(m).is_err()) {
        errors.add("map", MAP_MESSAGE);
    }
}

fn validate_time_slots(values: &[String]) -> Result<(), ValidationError> {
    parse_time_slots(values).map(|_| ())
}

fn parse_job(value: &str) -> Result<Job, ValidationError> {
    Job::from_str(value).map_err(|_| message_error("job", JOB_MESSAGE))
}

// 去重并按枚举顺序排列
fn parse_maps(values: &[String]) -> Result<Vec<GameMap>, ValidationError> {
    let maps = values.iter().map(|v| GameMap::from_str(v)).collect::<Result<BTreeSet<_>, _>>();
    maps.map(|set| set.into_iter().collect()).map_err(|_| message_error("maps", MAP_MESSAGE))
}

// 去重并按周一到周日、小时升序排列
fn parse_time_slots(values: &[String]) -> Result<Vec<TimeSlot>, ValidationError> {
    let slots = values.iter().map(|v| TimeSlot::from_str(v)).collect::<Result<BTreeSet<_>, _>>();
    slots.map(|set| set.into_iter().collect()).map_err(|_| message_error("availableTimes", SLOT_MESSAGE))
}

// maps 优先，其次旧版 map
fn map_list<'a>(maps: &'a Option<Vec<String>>, map: &'a Option<String>) -> Option<&'a [String]> {
    maps.as_deref().or(map.as_ref().map(std::slice::from_ref))
}

fn convert<T>(errors: &mut ValidationFailed, field: &str, value: Option<Result<T, ValidationError>>) -> Option<T> {
    match value? {
        Ok(v) => Some(v),
        Err(e) => {
            let message = e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string());
            errors.add(field, &message);
            None
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

/// 旧版 startTime/endTime 换算为每周时段
fn legacy_slots(start: Option<&str>, end: Option<&str>, errors: &mut ValidationFailed) -> Option<Vec<TimeSlot>> {
    let parsed_start = start.and_then(parse_rfc3339);
    let parsed_end = end.and_then(parse_rfc3339);
    match (start, parsed_start) {
        (Some(_), None) => errors.add("startTime", "開始時間格式錯誤"),
        (None, _) if end.is_some() => errors.add("startTime", "請輸入開始時間"),
        _ => {}
    }
    match (end, parsed_end) {
        (Some(_), None) => errors.add("endTime", "結束時間格式錯誤"),
        (None, _) if start.is_some() => errors.add("endTime", "請輸入結束時間"),
        _ => {}
    }
    let (start, end) = (parsed_start?, parsed_end?);
    if end <= start {
        errors.add("endTime", "結束時間必須晚於開始時間");
        return None;
    }
    if end - start > TimeDelta::days(7) {
        errors.add("endTime", "時間範圍不可超過一週");
        return None;
    }
    Some(TimeSlot::covering(start, end))
}
