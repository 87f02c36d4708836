use crate::result::{ApiResponse, result_data_msg};
use actix_web::{Responder, get, web};
use biz_service::biz_service::group_filter::GroupFilter;
use biz_service::biz_service::group_service::GroupService;
use biz_service::entitys::group_entity::GroupView;
use common::errors::{AppError, ErrorResponse};
use log::debug;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(group_list);
}

#[utoipa::path(
    get,
    path = "/groups",
    summary = "组队列表",
    description = "按创建时间倒序，不含私钥",
    tag = "组队",
    params(GroupFilter),
    responses(
        (status = 200, description = "组队列表", body = ApiResponse<Vec<GroupView>>),
        (status = 400, description = "筛选条件格式错误", body = ErrorResponse)
    )
)]
#[get("/groups")]
pub async fn group_list(service: web::Data<GroupService>, filter: web::Query<GroupFilter>) -> Result<impl Responder, AppError> {
    if filter.is_active() {
        debug!("筛选: {}", filter.summary());
    }
    let groups = service.list(&filter).await?;
    Ok(web::Json(result_data_msg(groups, "Groups retrieved successfully")))
}
