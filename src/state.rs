use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{cookie::SessionCookie, session::SessionRegistry};
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionRegistry>,
    pub cookie: SessionCookie,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        db::migrate(&db).await?;

        let sessions = Arc::new(SessionRegistry::with_system_clock(config.session.ttl()));
        Ok(Self::from_parts(db, config, sessions))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, sessions: Arc<SessionRegistry>) -> Self {
        let cookie = SessionCookie::from_config(&config.session);
        Self {
            db,
            config,
            sessions,
            cookie,
        }
    }

    /// In-memory database and a fresh registry, for tests.
    #[cfg(test)]
    pub async fn fake() -> Self {
        use crate::config::SessionConfig;

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            session: SessionConfig {
                ttl_minutes: 60 * 24,
                cookie_name: "session_token".into(),
                cookie_secure: false,
                sweep_interval_secs: 600,
            },
            max_photo_bytes: 64 * 1024,
        });
        let sessions = Arc::new(SessionRegistry::with_system_clock(config.session.ttl()));
        Self::from_parts(db::test_pool().await, config, sessions)
    }
}
