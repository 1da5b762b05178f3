use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn},
    middleware::auth::SessionKeys,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub keys: Arc<SessionKeys>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let orm = create_orm_conn(&pool);
        let keys = SessionKeys::new(config.jwt_secret.as_bytes(), config.cookie_secure);
        Self {
            pool,
            orm,
            keys: Arc::new(keys),
            config: Arc::new(config),
        }
    }
}
