use chrono::{DateTime, Datelike, Timelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// 星期，按周一到周日排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// 卡片上显示的单字标签
    pub fn short_label(&self) -> &'static str {
        match self {
            Weekday::Mon => "一",
            Weekday::Tue => "二",
            Weekday::Wed => "三",
            Weekday::Thu => "四",
            Weekday::Fri => "五",
            Weekday::Sat => "六",
            Weekday::Sun => "日",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid time slot: {0}")]
pub struct TimeSlotParseError(pub String);

/// 每周固定的一小时时段，格式 `{WEEKDAY}_{HH}`，如 `MON_20`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    weekday: Weekday,
    hour: u8,
}

lazy_static! {
    static ref SLOT_RE: Regex = Regex::new(r"^(MON|TUE|WED|THU|FRI|SAT|SUN)_([01][0-9]|2[0-3])$").unwrap();
}

impl TimeSlot {
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// `[start, end)` 区间经过的每个整点时段（UTC），已排序去重
    pub fn covering(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<TimeSlot> {
        let mut slots = Vec::new();
        let end_millis = end.timestamp_millis();
        let mut hour_start = start.timestamp().div_euclid(3600) * 3600;
        while hour_start * 1000 < end_millis {
            if let Some(t) = DateTime::<Utc>::from_timestamp(hour_start, 0) {
                slots.push(TimeSlot { weekday: t.weekday().into(), hour: t.hour() as u8 });
            }
            hour_start += 3600;
        }
        slots.sort();
        slots.dedup();
        slots
    }
}

impl FromStr for TimeSlot {
    type Err = TimeSlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SLOT_RE.captures(s).ok_or_else(|| TimeSlotParseError(s.to_string()))?;
        let weekday = Weekday::from_str(&caps[1]).map_err(|_| TimeSlotParseError(s.to_string()))?;
        let hour = caps[2].parse::<u8>().map_err(|_| TimeSlotParseError(s.to_string()))?;
        Ok(TimeSlot { weekday, hour })
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:02}", self.weekday, self.hour)
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = TimeSlotParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// 紧凑显示：`一: 20:00-22:00 | 三: 09:00`
pub fn format_available_times(slots: &[TimeSlot]) -> String {
    if slots.is_empty() {
        return "無設定時間".to_string();
    }
    let mut by_day: BTreeMap<Weekday, Vec<u8>> = BTreeMap::new();
    for slot in slots {
        by_day.entry(slot.weekday).or_default().push(slot.hour);
    }
    by_day
        .into_iter()
        .map(|(day, mut hours)| {
            hours.sort_unstable();
            hours.dedup();
            format!("{}: {}", day.short_label(), hour_ranges(&hours))
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

// 连续小时合并为区间，区间结束取下一个整点
fn hour_ranges(hours: &[u8]) -> String {
    let mut ranges = Vec::new();
    let mut iter = hours.iter().copied();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let (mut start, mut end) = (first, first);
    for h in iter {
        if h == end + 1 {
            end = h;
            continue;
        }
        ranges.push(render_range(start, end));
        start = h;
        end = h;
    }
    ranges.push(render_range(start, end));
    ranges.join(", ")
}

fn render_range(start: u8, end: u8) -> String {
    if start == end { format!("{:02}:00", start) } else { format!("{:02}:00-{:02}:00", start, end + 1) }
}
