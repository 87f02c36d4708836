mod common_handler;
mod group;
mod swagger;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{Error, HttpRequest, web};
use common::errors::{AppError, ValidationFailed};
use log::debug;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error));
    cfg.app_data(web::QueryConfig::default().error_handler(query_error));
    common_handler::configure(cfg);
    group::configure(cfg);
    swagger::configure(cfg);
}

// 请求体无法解析时按校验失败返回
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    debug!("invalid json body: {}", err);
    AppError::Validation(ValidationFailed::single("body", "請求內容必須是 JSON 物件")).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    debug!("invalid query: {}", err);
    AppError::Validation(ValidationFailed::single("query", "篩選條件格式錯誤")).into()
}
