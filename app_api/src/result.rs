use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use utoipa::ToSchema;

/// 统一响应包装 `{success, data, message?}`
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn result_data<T: Serialize + Debug>(data: T) -> Value {
    serde_json::json!({"success":true,"data":data})
}

pub fn result_data_msg<T: Serialize + Debug>(data: T, msg: &str) -> Value {
    serde_json::json!({"success":true,"data":data,"message":msg})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shapes() {
        assert_eq!(result_data(1), serde_json::json!({"success": true, "data": 1}));
        let v = result_data_msg("x", "done");
        assert_eq!(v["message"], "done");
        assert_eq!(result_data_msg(Value::Null, "ok"), serde_json::json!({"success": true, "data": null, "message": "ok"}));
    }
}
