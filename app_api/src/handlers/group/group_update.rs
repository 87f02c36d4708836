use crate::result::{ApiResponse, result_data_msg};
use actix_web::{Responder, put, web};
use biz_service::biz_service::group_service::GroupService;
use biz_service::dto::group_dto::UpdateGroupDto;
use biz_service::entitys::group_entity::GroupView;
use common::errors::{AppError, ErrorResponse};
use serde_json::Value;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(group_update);
}

#[utoipa::path(
    put,
    path = "/groups/{id}",
    summary = "修改组队",
    tag = "组队",
    params(("id" = String, Path, description = "组队 ID")),
    request_body = UpdateGroupDto,
    responses(
        (status = 200, description = "修改成功", body = ApiResponse<GroupView>),
        (status = 400, description = "私钥缺失或校验失败", body = ErrorResponse),
        (status = 404, description = "组队不存在或私钥错误", body = ErrorResponse),
        (status = 409, description = "并发修改冲突", body = ErrorResponse)
    )
)]
#[put("/groups/{id}")]
pub async fn group_update(
    service: web::Data<GroupService>,
    id: web::Path<String>,
    body: web::Json<Value>,
) -> Result<impl Responder, AppError> {
    let group = service.update(&id, &body).await?;
    Ok(web::Json(result_data_msg(group, "Group updated successfully")))
}
