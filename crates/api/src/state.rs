use std::sync::Arc;

use anyhow::bail;
use khidmat_domain::aid::DistributionService;
use khidmat_domain::issues::IssueService;
use khidmat_domain::ports::aid::AidDistributionRepository;
use khidmat_domain::ports::db::StoreHealth;
use khidmat_domain::ports::directory::DirectoryRepository;
use khidmat_domain::ports::issues::IssueRepository;
use khidmat_domain::ports::registry::RegistryRepository;
use khidmat_domain::ports::sessions::SessionStore;
use khidmat_domain::scope::ScopeService;
use khidmat_domain::session::{SessionConfig, SessionService};
use khidmat_infra::config::AppConfig;
use khidmat_infra::db::MemoryAdapter;
use khidmat_infra::repositories::{
    InMemoryAidDistributionRepository, InMemoryDirectoryRepository, InMemoryIssueRepository,
    InMemoryRegistryRepository, InMemorySessionStore,
};

pub struct Repositories {
    pub session_store: Arc<dyn SessionStore>,
    pub directory: Arc<dyn DirectoryRepository>,
    pub issues: Arc<dyn IssueRepository>,
    pub aid: Arc<dyn AidDistributionRepository>,
    pub registry: Arc<dyn RegistryRepository>,
    pub store_health: Arc<dyn StoreHealth>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionService,
    pub issues: Arc<IssueService>,
    pub distribution: Arc<DistributionService>,
    pub scope: ScopeService,
    pub store_health: Arc<dyn StoreHealth>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        match config.data_backend.as_str() {
            "memory" => {
                let repositories = Repositories {
                    session_store: Arc::new(InMemorySessionStore::new()),
                    directory: Arc::new(InMemoryDirectoryRepository::new()),
                    issues: Arc::new(InMemoryIssueRepository::new()),
                    aid: Arc::new(InMemoryAidDistributionRepository::new()),
                    registry: Arc::new(InMemoryRegistryRepository::new()),
                    store_health: Arc::new(MemoryAdapter),
                };
                Ok(Self::with_repositories(config, repositories))
            }
            other => bail!("unsupported data backend '{other}'"),
        }
    }

    pub fn with_repositories(config: AppConfig, repositories: Repositories) -> Self {
        let sessions = SessionService::new(
            repositories.session_store,
            repositories.directory,
            SessionConfig {
                ttl_ms: config.session_ttl_ms(),
            },
        );
        let issues = Arc::new(IssueService::new(repositories.issues));
        let scope = ScopeService::new(repositories.aid.clone());
        let distribution = Arc::new(DistributionService::new(
            repositories.aid,
            repositories.registry,
        ));
        Self {
            config,
            sessions,
            issues,
            distribution,
            scope,
            store_health: repositories.store_health,
        }
    }
}
