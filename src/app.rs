use axum::{
    Router,
    extract::{MatchedPath, Path, Request},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::config::{Config, StoreKind};
use crate::login::{self, AdminCredentials};
use crate::store::{MemoryStore, RedisStore, StudentStore};
use crate::students;

/// Shared state handed to every handler
pub struct AppState {
    /// Where student hashes live
    pub store: Arc<dyn StudentStore>,

    /// The account accepted by `/login`
    pub credentials: AdminCredentials,
}

impl AppState {
    pub fn new(store: Arc<dyn StudentStore>, credentials: AdminCredentials) -> Self {
        AppState { store, credentials }
    }
}

/// Build the full router: pages, assets, auth, records, import/export and dashboard
///
/// # Arguments
/// * `state` - Shared application state
///
/// # Returns
/// * `Router` - Ready to be served
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(login::serve_login_page))
        .route("/app", get(serve_app_page))
        .route("/static/:asset", get(serve_asset))
        .route("/login", post(login::handle_login))
        .route("/logout", post(login::handle_logout))
        .route(
            "/students",
            get(students::handle_list_students).post(students::handle_create_student),
        )
        .route("/students/import", post(students::handle_import))
        .route(
            "/students/import/preview",
            post(students::handle_import_preview),
        )
        .route("/students/export/:format", get(students::handle_export))
        .route(
            "/students/:id",
            get(students::handle_get_student)
                .put(students::handle_update_student)
                .delete(students::handle_delete_student),
        )
        .route("/dashboard", get(students::handle_dashboard))
        .route("/dashboard/charts/:chart", get(students::handle_chart))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_requests))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Open the configured store
///
/// A Redis backend that cannot be reached is an error; the server does
/// not start without its store.
pub async fn open_store(config: &Config) -> crate::error::Result<Arc<dyn StudentStore>> {
    let store: Arc<dyn StudentStore> = match config.store {
        StoreKind::Redis => Arc::new(RedisStore::connect(&config.redis_url).await?),
        StoreKind::Memory => match &config.snapshot {
            Some(path) => Arc::new(MemoryStore::with_snapshot(path)?),
            None => Arc::new(MemoryStore::new()),
        },
    };

    Ok(store)
}

/// Start the server and block until it stops
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr()?;

    let store = open_store(&config).await.map_err(|e| {
        log::error!("Could not open the {:?} store: {}", config.store, e);
        e
    })?;
    log::info!("Using {} store", store.backend_name());

    let credentials = AdminCredentials {
        username: config.admin_username.clone(),
        password: config.admin_password.clone(),
    };
    let app = router(Arc::new(AppState::new(store, credentials)));

    let listener = TcpListener::bind(addr).await?;
    log::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn log_requests(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = started.elapsed().as_millis();
    if status.is_server_error() {
        log::error!("{} {} -> {} ({} ms)", method, path, status.as_u16(), elapsed);
    } else {
        log::info!("{} {} -> {} ({} ms)", method, path, status.as_u16(), elapsed);
    }

    response
}

async fn serve_app_page() -> Html<&'static str> {
    Html(include_str!("./static/students.html"))
}

async fn serve_asset(Path(asset): Path<String>) -> Response {
    let (content_type, body) = match asset.as_str() {
        "students.js" => (
            "application/javascript; charset=utf-8",
            include_str!("./static/students.js"),
        ),
        "students.css" => ("text/css; charset=utf-8", include_str!("./static/students.css")),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}
