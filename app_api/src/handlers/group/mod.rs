use actix_web::web;

pub mod group_create;
pub mod group_delete;
pub mod group_list;
pub mod group_update;

pub fn configure(cfg: &mut web::ServiceConfig) {
    group_create::configure(cfg);
    group_list::configure(cfg);
    group_update::configure(cfg);
    group_delete::configure(cfg);
}
