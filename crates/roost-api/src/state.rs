//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! `MessagingService` is generic over its ports; AppState pins it to the
//! SQLite implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use roost_core::service::messaging::MessagingService;
use roost_infra::config::resolve_database_url;
use roost_infra::sqlite::chat::SqliteChatRepository;
use roost_infra::sqlite::message::SqliteMessageRepository;
use roost_infra::sqlite::pool::DatabasePool;
use roost_infra::sqlite::token::SqliteTokenStore;
use roost_infra::sqlite::user::SqliteUserDirectory;
use roost_types::config::ServerConfig;

pub type ConcreteMessagingService =
    MessagingService<SqliteChatRepository, SqliteMessageRepository, SqliteUserDirectory>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub messaging: Arc<ConcreteMessagingService>,
    /// Resolves request credentials; also issues and revokes them for the CLI.
    pub tokens: SqliteTokenStore,
    pub users: SqliteUserDirectory,
    pub config: Arc<ServerConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Connect to the database (running migrations) and wire services.
    pub async fn init(data_dir: &Path, config: ServerConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let db_url = resolve_database_url(&config, data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;

        let users = SqliteUserDirectory::new(db_pool.clone());
        let messaging = MessagingService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteMessageRepository::new(db_pool.clone()),
            users.clone(),
        );

        Ok(Self {
            messaging: Arc::new(messaging),
            tokens: SqliteTokenStore::new(db_pool),
            users,
            config: Arc::new(config),
            data_dir: data_dir.to_path_buf(),
        })
    }
}
