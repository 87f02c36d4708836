use crate::result::{ApiResponse, result_data};
use actix_web::{Responder, get, web};
use biz_service::biz_service::group_service::{GroupService, StoreStatus};
use common::errors::{AppError, ErrorResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(status);
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "Common",
    summary = "Get the status of the service",
    responses(
        (status = 200, description = "存储可用", body = ApiResponse<StoreStatus>),
        (status = 500, description = "存储不可用", body = ErrorResponse)
    )
)]
#[get("/status")]
pub async fn status(service: web::Data<GroupService>) -> Result<impl Responder, AppError> {
    let status = service.status().await?;
    Ok(web::Json(result_data(status)))
}
