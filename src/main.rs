//! Cookbook Archive
//!
//! A local app server for a personal cookbook and recipe collection. Identity and rows
//! live on a hosted auth/database backend; this process keeps the session and an
//! in-memory mirror of the user's collections and serves JSON view models.

mod api;
mod config;
mod db;
mod errors;
mod gateway;
mod lookup;
mod models;
mod routes;
mod session;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::SessionRepository;
use gateway::RestGateway;
use lookup::LookupAdapter;
use models::{Cookbook, Recipe};
use session::SessionStore;
use store::CollectionStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub cookbooks: Arc<CollectionStore<Cookbook>>,
    pub recipes: Arc<CollectionStore<Recipe>>,
    pub lookup: Arc<LookupAdapter>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the gateway, session and stores together and start following the session.
    pub fn new(config: Config, repo: Option<SessionRepository>) -> Result<Self, errors::AppError> {
        let gateway = Arc::new(RestGateway::new(
            &config.backend_url,
            &config.backend_key,
            config.http_timeout,
        )?);
        let lookup = LookupAdapter::new(
            &config.open_library_url,
            &config.google_books_url,
            config.http_timeout,
        )?;

        let session = Arc::new(SessionStore::new(gateway.clone(), repo));
        let cookbooks = Arc::new(CollectionStore::new(gateway.clone()));
        let recipes = Arc::new(CollectionStore::new(gateway));

        cookbooks.clone().follow_session(session.subscribe());
        recipes.clone().follow_session(session.subscribe());

        Ok(Self {
            session,
            cookbooks,
            recipes,
            lookup: Arc::new(lookup),
            config: Arc::new(config),
        })
    }

    /// Wait for both collections to finish loading after a sign-in, at most one
    /// request timeout. A failed load ends the wait early.
    pub async fn collections_ready(&self) {
        let Some(user) = self.session.user() else {
            return;
        };
        let ready = async {
            tokio::join!(
                self.cookbooks.settled_for(user.id),
                self.recipes.settled_for(user.id)
            );
        };
        if tokio::time::timeout(self.config.http_timeout, ready).await.is_err() {
            tracing::warn!("Collections still loading after sign-in");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cookbook Archive");
    tracing::info!("Backend: {}", config.backend_url);
    tracing::info!("Session database: {:?}", config.session_db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Session persistence
    let pool = db::init_database(&config.session_db_path).await?;
    let repo = SessionRepository::new(pool);

    let bind_addr = config.bind_addr;
    let state = AppState::new(config, Some(repo))?;

    // Resume the previous session before serving anything
    state.session.restore().await;
    if let Some(user) = state.session.user() {
        tracing::info!(user_id = %user.id, "Resumed session for {}", user.email);
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Screens that need a session
    let pages = Router::new()
        .route("/", get(api::home_page))
        .route("/favorites", get(api::favorites_page))
        .route("/cookbooks", get(api::cookbooks_page))
        .route("/cookbook/{id}", get(api::cookbook_page))
        .route("/cookbook/{id}/edit", get(api::cookbook_edit_page))
        .route("/recipes", get(api::recipes_page))
        .route("/recipe/{id}", get(api::recipe_page))
        .route("/recipe/{id}/edit", get(api::recipe_edit_page))
        .route("/profile", get(api::profile_page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::page_guard,
        ));

    // Actions that need a session
    let actions = Router::new()
        // Cookbooks
        .route("/cookbooks", post(api::create_cookbook))
        .route(
            "/cookbooks/{id}",
            put(api::update_cookbook).delete(api::delete_cookbook),
        )
        .route(
            "/cookbooks/{id}/favorite",
            post(api::toggle_cookbook_favorite),
        )
        // Recipes
        .route("/recipes", post(api::create_recipe))
        .route(
            "/recipes/{id}",
            put(api::update_recipe).delete(api::delete_recipe),
        )
        .route("/recipes/{id}/favorite", post(api::toggle_recipe_favorite))
        // Profile and lookup
        .route("/profile", put(api::update_profile))
        .route("/lookup/{isbn}", get(api::lookup_isbn))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::api_guard,
        ));

    // Public screens, auth actions and health check
    let public = Router::new()
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/register", post(api::register))
        .route("/api/auth/logout", post(api::logout))
        .route("/api/auth/session", get(api::current_session))
        .route("/login", get(api::login_page))
        .route("/register", get(api::register_page))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", actions)
        .merge(pages)
        .merge(public)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
