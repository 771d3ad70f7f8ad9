//! Server State
//!
//! Everything a handler needs, cloned into each request. All fields are
//! cheap handles (`Arc`s and the connection pool).

use std::sync::Arc;

use crate::core::Config;
use crate::db::DbService;
use crate::registry::MemberRegistry;
use crate::services::{
    Argon2Hasher, LocalBlobStorage, LogEmitter, NotificationEmitter, WebhookEmitter,
};
use shared::error::AppError;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub pool: SqlitePool,
    pub registry: MemberRegistry,
}

impl ServerState {
    /// 初始化服务器状态：打开数据库、执行迁移、装配登记服务的协作组件
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(config).await?;
        let pool = db.pool.clone();

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .map_err(|e| AppError::internal(format!("Failed to create upload dir: {e}")))?;
        let storage = Arc::new(LocalBlobStorage::new(
            &config.upload_dir,
            config.max_upload_bytes,
        ));

        let emitter: Arc<dyn NotificationEmitter> = match &config.notify_webhook_url {
            Some(url) => {
                let webhook = WebhookEmitter::new(url.as_str())
                    .map_err(|e| AppError::internal(format!("Invalid NOTIFY_WEBHOOK_URL: {e}")))?;
                tracing::info!(url = %url, "Notifications delivered by webhook");
                Arc::new(webhook)
            }
            None => Arc::new(LogEmitter),
        };

        let registry = MemberRegistry::new(pool.clone(), storage, Arc::new(Argon2Hasher), emitter);

        Ok(Self {
            config: config.clone(),
            db,
            pool,
            registry,
        })
    }
}
