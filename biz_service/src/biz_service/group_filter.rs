use crate::entitys::group_entity::{GameMap, GroupView, Job};
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;
use utoipa::IntoParams;

/// 等级筛选允许的上下差距
pub const LEVEL_RANGE: i64 = 5;

/// 列表筛选条件，空字符串视为未设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GroupFilter {
    /// 职业
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>, example = "龍騎士")]
    pub job: Option<Job>,
    /// 地图
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>, example = "DT")]
    pub map: Option<GameMap>,
    /// 我的等级，匹配 ±5 级
    #[serde(rename = "myLevel", default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<i64>, example = 85)]
    pub my_level: Option<i64>,
}

impl GroupFilter {
    pub fn is_active(&self) -> bool {
        self.job.is_some() || self.map.is_some() || self.my_level.is_some()
    }

    pub fn matches(&self, group: &GroupView) -> bool {
        if self.job.is_some_and(|job| job != group.job) {
            return false;
        }
        if self.map.is_some_and(|map| !group.maps.contains(&map)) {
            return false;
        }
        if self.my_level.is_some_and(|level| group.level.abs_diff(level) > LEVEL_RANGE as u64) {
            return false;
        }
        true
    }

    /// 如 `職業: 龍騎士, 地圖: DT, 等級: 80 - 90`
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(job) = self.job {
            parts.push(format!("職業: {}", job));
        }
        if let Some(map) = self.map {
            parts.push(format!("地圖: {}", map));
        }
        if let Some(level) = self.my_level {
            parts.push(format!("等級: {} - {}", level.saturating_sub(LEVEL_RANGE), level.saturating_add(LEVEL_RANGE)));
        }
        parts.join(", ")
    }
}

/// 保持输入顺序
pub fn filter_groups(groups: Vec<GroupView>, filter: &GroupFilter) -> Vec<GroupView> {
    if !filter.is_active() {
        return groups;
    }
    groups.into_iter().filter(|g| filter.matches(g)).collect()
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
