use uuid::Uuid;

/// 生成无连字符的 UUID 字符串
pub fn build_id() -> String {
    let uuid = Uuid::new_v4().simple();
    format!("{}", uuid)
}
