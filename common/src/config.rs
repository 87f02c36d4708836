use anyhow::{Context, Result, anyhow};
use config::Config;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub server: Option<ServerConfig>,
    pub sys: Option<SysConfig>,
}

impl AppConfig {
    /// 读取配置文件，环境变量覆盖（APP_SERVER__PORT=8080）
    pub fn new(file: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(config::File::with_name(file).required(true))
            .add_source(config::Environment::with_prefix("APP").prefix_separator("_").separator("__").try_parsing(true))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", file))?;
        let cfg = config.try_deserialize::<AppConfig>().context("Failed to deserialize configuration")?;
        Ok(cfg)
    }

    pub fn init(file: &str) -> Result<()> {
        let instance = Self::new(file)?;
        INSTANCE.set(Arc::new(instance)).map_err(|_| anyhow!("AppConfig already initialized"))
    }

    pub fn get_database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }
    pub fn get_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
    pub fn get_sys(&self) -> SysConfig {
        self.sys.clone().unwrap_or_default()
    }

    /// 获取单例，未初始化时返回默认配置
    pub fn get() -> Arc<Self> {
        INSTANCE.get().cloned().unwrap_or_default()
    }
}
static INSTANCE: OnceCell<Arc<AppConfig>> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub db_name: String,
    //组队记录集合名
    pub collection: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "mongodb://localhost:27017".to_string(), db_name: "group_finder".to_string(), collection: "groups".to_string() }
    }
}

/// 存储后端
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Mongo,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SysConfig {
    //全局日志级别
    pub log_level: String,
    pub store: StoreKind,
}

impl Default for SysConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), store: StoreKind::Mongo }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 3000 }
    }
}
