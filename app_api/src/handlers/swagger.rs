use crate::handlers::common_handler::*;
use crate::handlers::group::group_create::*;
use crate::handlers::group::group_delete::*;
use crate::handlers::group::group_list::*;
use crate::handlers::group::group_update::*;

use crate::result::ApiResponse;
use actix_web::{HttpResponse, Responder, get, web};
use biz_service::biz_service::group_service::StoreStatus;
use biz_service::dto::group_dto::{CreateGroupDto, DeleteGroupDto, UpdateGroupDto};
use biz_service::entitys::group_entity::{GameMap, GroupView, Job};
use common::errors::{AppError, ErrorResponse, FieldError};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        status,

        //组队
        group_create,
        group_list,
        group_update,
        group_delete,
    ),
    components(schemas(
        ApiResponse<GroupView>,
        ApiResponse<Vec<GroupView>>,
        ApiResponse<StoreStatus>,
        GroupView,
        Job,
        GameMap,
        CreateGroupDto,
        UpdateGroupDto,
        DeleteGroupDto,
        ErrorResponse,
        FieldError,
    )),
    tags(
        (name = "组队", description = "组队刊登、修改与删除")
    )
)]
pub struct ApiDoc;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}

#[get("/openapi.json")]
async fn openapi_json() -> Result<impl Responder, AppError> {
    let json = ApiDoc::openapi().to_json()?;
    Ok(HttpResponse::Ok().content_type("application/json").body(json))
}
