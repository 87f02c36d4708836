use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use app_api::handlers;
use biz_service::biz_service::group_service::GroupService;
use biz_service::manager::group_store::GroupStore;
use biz_service::manager::group_store_memory_impl::MemoryGroupStore;
use biz_service::manager::group_store_mongo_impl::MongoGroupStore;
use biz_service::manager::secret_manager::OsSecretSource;
use common::config::{AppConfig, StoreKind};
use log::{LevelFilter, info, warn};
use std::str::FromStr;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 读取配置文件
    let file = std::env::args().nth(1).unwrap_or_else(|| "api-config.toml".to_string());
    AppConfig::init(&file)?;
    let app_cfg = AppConfig::get();
    //初始化日志
    init_log(&app_cfg)?;

    let store = build_store(&app_cfg).await?;
    let service = web::Data::new(GroupService::new(store, Arc::new(OsSecretSource)));

    let address_and_port = format!("{}:{}", &app_cfg.get_server().host, &app_cfg.get_server().port);
    warn!("Starting server on {}", address_and_port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(service.clone())
            // 配置 控制器
            .configure(|cfg| {
                handlers::configure(cfg);
            })
    })
    .keep_alive(actix_web::http::KeepAlive::Timeout(std::time::Duration::from_secs(600))) // 允许 10 分钟超时
    .bind(address_and_port)?
    .run()
    .await?;
    Ok(())
}

pub fn init_log(config: &AppConfig) -> anyhow::Result<()> {
    let log_level = config.get_sys().log_level;
    let level = LevelFilter::from_str(&log_level).with_context(|| format!("invalid log_level: {}", log_level))?;
    env_logger::Builder::new().filter(None, level).init();
    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn GroupStore>> {
    match config.get_sys().store {
        StoreKind::Mongo => {
            let db_cfg = config.get_database();
            let db = common::db::connect(&db_cfg).await?;
            let store = MongoGroupStore::new(&db, &db_cfg.collection);
            store.init_indexes().await.context("failed to create group indexes")?;
            info!("✅ MongoDB 存储: {}/{}", db_cfg.db_name, db_cfg.collection);
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            warn!("⚠️ 使用内存存储，重启后数据丢失");
            Ok(Arc::new(MemoryGroupStore::new()))
        }
    }
}
