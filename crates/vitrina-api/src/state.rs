use sqlx::SqlitePool;
use std::sync::Arc;
use vitrina_core::Config;
use vitrina_db::{PromotionRepository, SellerRepository, UploadProfileRepository, UserRepository};
use vitrina_processing::Orchestrator;
use vitrina_storage::{PathPlanner, PublicStore};

/// Shared application state. The orchestrator gets one accessor per entity
/// type, keyed by the upload-profile slug that governs it; routes never talk
/// to the pipeline through anything else.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub profiles: UploadProfileRepository,
    pub users: UserRepository,
    pub sellers: SellerRepository,
    pub promotions: PromotionRepository,
    pub planner: PathPlanner,
    pub store: PublicStore,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let profiles = UploadProfileRepository::new(pool.clone());
        let users = UserRepository::new(pool.clone());
        let sellers = SellerRepository::new(pool.clone());
        let promotions = PromotionRepository::new(pool);

        let planner = PathPlanner::new(&config.public_dir);
        let store = PublicStore::new(&config.public_dir);

        let orchestrator = Orchestrator::new(Arc::new(profiles.clone()), store.clone())
            .register_accessor("users", Arc::new(users.clone()))
            .register_accessor("sellers", Arc::new(sellers.clone()))
            .register_accessor("promotions", Arc::new(promotions.clone()));

        AppState {
            config,
            profiles,
            users,
            sellers,
            promotions,
            planner,
            store,
            orchestrator: Arc::new(orchestrator),
        }
    }
}
