//! Application state wiring all services together.
//!
//! Services are generic over the repository traits, but AppState pins them to
//! the concrete SQLite implementations. Each service owns its own
//! `AccessGuard`; the repositories are cheap pool-handle clones, so the
//! instances share one database underneath.

use std::path::PathBuf;
use std::sync::Arc;

use tangle_core::access::guard::AccessGuard;
use tangle_core::chat::service::ChatService;
use tangle_core::collab::manager::SessionManager;
use tangle_core::event::bus::EventBus;
use tangle_core::graph::store::GraphStore;
use tangle_infra::sqlite::chat::SqliteChatRepository;
use tangle_infra::sqlite::collab::SqliteSessionRepository;
use tangle_infra::sqlite::message::SqliteMessageRepository;
use tangle_infra::sqlite::pool::DatabasePool;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService =
    ChatService<SqliteChatRepository, SqliteMessageRepository, SqliteSessionRepository>;

pub type ConcreteGraphStore =
    GraphStore<SqliteMessageRepository, SqliteChatRepository, SqliteSessionRepository>;

pub type ConcreteSessionManager = SessionManager<SqliteSessionRepository, SqliteChatRepository>;

/// Broadcast capacity for the chat event bus. Slow WebSocket subscribers past
/// this many buffered events start lagging instead of blocking publishers.
const EVENT_BUS_CAPACITY: usize = 256;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub graph_store: Arc<ConcreteGraphStore>,
    pub session_manager: Arc<ConcreteSessionManager>,
    pub event_bus: EventBus,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("tangle.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        Self::with_pool(db_pool, data_dir)
    }

    /// Wire services over an existing pool. Split out so tests can use a
    /// temporary database.
    pub fn with_pool(db_pool: DatabasePool, data_dir: PathBuf) -> anyhow::Result<Self> {
        let event_bus = EventBus::new(EVENT_BUS_CAPACITY);

        let chat_repo = SqliteChatRepository::new(db_pool.clone());
        let message_repo = SqliteMessageRepository::new(db_pool.clone());
        let session_repo = SqliteSessionRepository::new(db_pool.clone());

        let chat_service = ChatService::new(
            chat_repo.clone(),
            message_repo.clone(),
            AccessGuard::new(chat_repo.clone(), session_repo.clone()),
            event_bus.clone(),
        );

        let graph_store = GraphStore::new(
            message_repo.clone(),
            AccessGuard::new(chat_repo.clone(), session_repo.clone()),
            event_bus.clone(),
        );

        let session_manager = SessionManager::new(
            session_repo.clone(),
            AccessGuard::new(chat_repo, session_repo),
            event_bus.clone(),
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            graph_store: Arc::new(graph_store),
            session_manager: Arc::new(session_manager),
            event_bus,
            data_dir,
            db_pool,
        })
    }
}

/// Data directory: `TANGLE_DATA_DIR` env var, falling back to `~/.tangle`.
pub fn resolve_data_dir() -> PathBuf {
    std::env::var("TANGLE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".tangle")
        })
}
