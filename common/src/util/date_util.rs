use chrono::{DateTime, SecondsFormat, Utc};

/// 当前时间（Unix 毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 毫秒时间戳转 RFC 3339 字符串
pub fn millis_to_rfc3339(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(t) => t.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => String::new(),
    }
}

pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_millis() {
        assert_eq!(millis_to_rfc3339(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(millis_to_rfc3339(1_752_609_600_123), "2025-07-15T20:00:00.123Z");
    }

    #[test]
    fn parse_with_offset() {
        let t = parse_rfc3339("2025-07-16T04:00:00+08:00").unwrap();
        assert_eq!(t.timestamp_millis(), 1_752_609_600_000);
        assert!(parse_rfc3339("yesterday").is_none());
    }
}
