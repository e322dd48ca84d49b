//! Application state - Dependency injection container.
//!
//! Provides centralized access to the application services and
//! infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, UserStore};
use crate::services::{AuthService, JwtAuthenticator, UserManager, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Token verification service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from a database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let repo = Arc::new(UserStore::new(database.get_connection()));
        let user_service = Arc::new(UserManager::new(repo));
        let auth_service = Arc::new(JwtAuthenticator::new(config));

        Self::new(auth_service, user_service, database)
    }

    /// Create application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            database,
        }
    }
}
