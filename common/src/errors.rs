use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use mongodb::error::Error as MongoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

pub const NOT_FOUND_MESSAGE: &str = "Group not found or invalid private key";

/// 单个字段的校验失败原因
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct FieldError {
    #[schema(example = "level")]
    pub field: String,
    #[schema(example = "目前開放的最低等級是 70 等")]
    pub message: String,
}

/// 校验失败集合，每个字段只保留第一条原因
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailed {
    details: Vec<FieldError>,
}

impl ValidationFailed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut failed = Self::new();
        failed.add(field, message);
        failed
    }

    pub fn add(&mut self, field: &str, message: &str) {
        if self.contains(field) {
            return;
        }
        self.details.push(FieldError { field: field.to_string(), message: message.to_string() });
        self.details.sort_by(|a, b| a.field.cmp(&b.field));
    }

    /// 合并 validator 的结果
    pub fn merge(&mut self, errors: &validator::ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            if let Some(first) = errs.first() {
                let message = first.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| first.code.to_string());
                self.add(&to_camel_case(&field), &message);
            }
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.details.iter().any(|d| d.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn details(&self) -> &[FieldError] {
        &self.details
    }

    /// 无错误时返回 value
    pub fn finish<T>(self, value: T) -> Result<T, ValidationFailed> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.details.iter().map(|d| format!("{}: {}", d.field, d.message)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<validator::ValidationErrors> for ValidationFailed {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut failed = ValidationFailed::new();
        failed.merge(&e);
        failed
    }
}

// 对外字段名统一为 camelCase
fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// HTTP 错误响应结构
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    // ==== 常规业务错误 ====
    #[error("Validation failed: {0}")]
    Validation(ValidationFailed),

    #[error("Private key is required")]
    MissingPrivateKey,

    // id 不存在与私钥错误不做区分
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("Conflict: group changed concurrently")]
    Conflict,

    // ==== 系统错误 ====
    #[error("MongoDB error: {0}")]
    Mongo(#[from] MongoError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<ValidationFailed> for AppError {
    fn from(e: ValidationFailed) -> Self {
        AppError::Validation(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MissingPrivateKey => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(failed) => ErrorResponse {
                success: false,
                error: "Validation failed".to_string(),
                details: Some(failed.details().to_vec()),
            },
            AppError::MissingPrivateKey | AppError::NotFound | AppError::Conflict => {
                ErrorResponse { success: false, error: self.to_string(), details: None }
            }
            e => {
                // 内部细节只写日志
                error!("{:?}", e);
                ErrorResponse { success: false, error: "Internal server error".to_string(), details: None }
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn first_reason_per_field_wins() {
        let mut failed = ValidationFailed::new();
        failed.add("level", "first");
        failed.add("level", "second");
        failed.add("gameId", "missing");
        assert_eq!(failed.details().len(), 2);
        // 按字段名排序
        assert_eq!(failed.details()[0].field, "gameId");
        assert_eq!(failed.details()[1].message, "first");
    }

    #[test]
    fn merge_validator_errors() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("range");
        err.message = Some("too low".into());
        errors.add("level", err);
        errors.add("game_id", ValidationError::new("required"));

        let failed = ValidationFailed::from(errors);
        assert!(failed.contains("level"));
        assert_eq!(failed.details()[0], FieldError { field: "gameId".into(), message: "required".into() });
        assert_eq!(failed.details()[1].message, "too low");
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::MissingPrivateKey.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Validation(ValidationFailed::single("level", "x")).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Internal("boom".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::NotFound.to_string(), NOT_FOUND_MESSAGE);
    }
}
