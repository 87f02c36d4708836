use crate::result::{ApiResponse, result_data_msg};
use actix_web::{Responder, delete, web};
use biz_service::biz_service::group_service::GroupService;
use biz_service::dto::group_dto::DeleteGroupDto;
use common::errors::{AppError, ErrorResponse};
use serde_json::Value;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(group_delete);
}

#[utoipa::path(
    delete,
    path = "/groups/{id}",
    summary = "删除组队",
    tag = "组队",
    params(("id" = String, Path, description = "组队 ID")),
    request_body = DeleteGroupDto,
    responses(
        (status = 200, description = "删除成功", body = ApiResponse<String>),
        (status = 400, description = "私钥缺失", body = ErrorResponse),
        (status = 404, description = "组队不存在或私钥错误", body = ErrorResponse)
    )
)]
#[delete("/groups/{id}")]
pub async fn group_delete(
    service: web::Data<GroupService>,
    id: web::Path<String>,
    body: Option<web::Json<Value>>,
) -> Result<impl Responder, AppError> {
    service.delete(&id, body.as_deref()).await?;
    Ok(web::Json(result_data_msg(Value::Null, "Group deleted successfully")))
}
