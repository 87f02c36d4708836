use crate::result::{ApiResponse, result_data_msg};
use actix_web::{HttpResponse, Responder, post, web};
use biz_service::biz_service::group_service::GroupService;
use biz_service::dto::group_dto::CreateGroupDto;
use biz_service::entitys::group_entity::GroupView;
use common::errors::{AppError, ErrorResponse};
use serde_json::Value;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(group_create);
}

#[utoipa::path(
    post,
    path = "/groups",
    summary = "刊登组队",
    description = "创建成功时返回私钥，仅此一次",
    tag = "组队",
    request_body = CreateGroupDto,
    responses(
        (status = 201, description = "创建成功", body = ApiResponse<GroupView>),
        (status = 400, description = "校验失败", body = ErrorResponse)
    )
)]
#[post("/groups")]
pub async fn group_create(service: web::Data<GroupService>, body: web::Json<Value>) -> Result<impl Responder, AppError> {
    let group = service.create(&body).await?;
    Ok(HttpResponse::Created().json(result_data_msg(group, "Group created successfully")))
}
