use common::errors::ValidationFailed;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// 按字段读取原始 JSON，类型不符时记录该字段错误并继续
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
    errors: ValidationFailed,
}

impl<'a> Payload<'a> {
    pub fn new(body: &'a Value) -> Result<Self, ValidationFailed> {
        match body.as_object() {
            Some(fields) => Ok(Self { fields, errors: ValidationFailed::new() }),
            None => Err(ValidationFailed::single("body", "請求內容必須是 JSON 物件")),
        }
    }

    /// 缺失与 null 都视为未提供
    pub fn read<T: DeserializeOwned>(&mut self, field: &str, message: &str) -> Option<T> {
        self.read_nullable(field, message).flatten()
    }

    /// 缺失返回 None，显式 null 返回 Some(None)
    pub fn read_nullable<T: DeserializeOwned>(&mut self, field: &str, message: &str) -> Option<Option<T>> {
        match self.fields.get(field)? {
            Value::Null => Some(None),
            value => match T::deserialize(value) {
                Ok(v) => Some(Some(v)),
                Err(_) => {
                    self.errors.add(field, message);
                    None
                }
            },
        }
    }

    pub fn into_errors(self) -> ValidationFailed {
        self.errors
    }
}
