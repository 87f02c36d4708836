use std::borrow::Cow;
use std::collections::HashMap;
use validator::ValidationError;

/// 带提示文字的校验错误
pub fn message_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError { code: Cow::Borrowed(code), message: Some(Cow::Borrowed(message)), params: HashMap::new() }
}
