//! Tally Web Server
//!
//! Axum-based REST API for the Tally finance tracker.
//!
//! Request flow: the bearer credential is resolved to a caller identity by
//! the auth middleware, every handler runs a permission-matrix check that
//! writes an audit record for both outcomes, and ownership is enforced per
//! record on top of that. Errors are surfaced as JSON with the statuses
//! described in the API contract (401/403/404/400/409/500).

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use tally_core::db::Database;
use tally_core::models::Role;
use tally_core::PermissionMatrix;

mod authz;
mod handlers;
pub mod token;

pub use authz::{REASON_OWNERSHIP, REASON_ROLE_RESTRICTED};

/// Maximum upload size (10 MB), covering receipt images and CSV files
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Maximum JSON body size (2 MB)
pub const MAX_JSON_SIZE: usize = 2 * 1024 * 1024;

/// Maximum audit listing size
pub const MAX_AUDIT_LIMIT: i64 = 1000;

/// Environment variable for the token signing secret
pub const JWT_SECRET_ENV: &str = "TALLY_JWT_SECRET";

/// Server configuration, fixed at startup
#[derive(Clone)]
pub struct ServerConfig {
    /// HMAC secret for the bearer credential
    pub jwt_secret: String,
    /// Directory for uploaded receipt files, served at /uploads
    pub uploads_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret".to_string(),
            uploads_dir: PathBuf::from("uploads"),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Immutable permission table, constructed once at startup
    pub permissions: PermissionMatrix,
}

/// Verified caller identity plus request metadata for audit records
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: i64,
    pub role: Role,
    pub email: String,
    pub ip: String,
    pub path: String,
}

/// Authentication middleware: resolves the bearer credential
///
/// Missing, malformed, expired, and badly-signed tokens all produce the same
/// unauthorized response so no validity information leaks.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    connect_info: Option<axum::extract::ConnectInfo<std::net::SocketAddr>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|t| token::verify(&state.config.jwt_secret, t));

    let Some(claims) = claims else {
        return AppError::unauthorized().into_response();
    };

    let Ok(role) = claims.role.parse::<Role>() else {
        return AppError::unauthorized().into_response();
    };

    // The nested router strips /api; keep the original path for audit rows
    let path = request
        .extensions()
        .get::<axum::extract::OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let caller = Caller {
        user_id: claims.user_id,
        role,
        email: claims.email,
        ip: connect_info
            .map(|ci| ci.0.ip().to_string())
            .unwrap_or_default(),
        path,
    };

    request.extensions_mut().insert(caller);
    next.run(request).await
}

/// Create the application router
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let uploads_dir = config.uploads_dir.clone();

    let state = Arc::new(AppState {
        db,
        config,
        permissions: PermissionMatrix::standard(),
    });

    // Registration, login, and the static catalogs need no credential
    let public = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/categories", get(handlers::list_categories))
        .route("/accounts", get(handlers::list_account_labels));

    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .route("/dashboard", get(handlers::get_dashboard))
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/export.csv",
            get(handlers::export_transactions_csv),
        )
        .route(
            "/transactions/import.csv",
            post(handlers::import_transactions_csv),
        )
        .route(
            "/transactions/:id",
            put(handlers::update_transaction).delete(handlers::delete_transaction),
        )
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route(
            "/budgets/:id",
            put(handlers::update_budget).delete(handlers::delete_budget),
        )
        .route(
            "/clients",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route(
            "/clients/:id",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
        .route(
            "/invoices",
            get(handlers::list_invoices).post(handlers::create_invoice),
        )
        .route(
            "/invoices/:id",
            get(handlers::get_invoice)
                .put(handlers::update_invoice)
                .delete(handlers::delete_invoice),
        )
        .route("/audit", get(handlers::list_audit_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api", public.merge(protected))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    let app = create_router(db, config)
        .into_make_service_with_connect_info::<std::net::SocketAddr>();
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
///
/// Forbidden responses carry a machine-readable reason code; nothing about
/// the denied resource is disclosed.
pub struct AppError {
    status: StatusCode,
    message: String,
    reason: Option<&'static str>,
}

impl AppError {
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "unauthorized".to_string(),
            reason: None,
        }
    }

    pub fn forbidden(reason: &'static str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: "forbidden".to_string(),
            reason: Some(reason),
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            reason: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            reason: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            reason: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            reason: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.message, "Internal error");
        }

        let body = match self.reason {
            Some(reason) => Json(serde_json::json!({
                "error": self.message,
                "reason": reason,
            })),
            None => Json(serde_json::json!({
                "error": self.message,
            })),
        };

        (self.status, body).into_response()
    }
}

impl From<tally_core::Error> for AppError {
    fn from(err: tally_core::Error) -> Self {
        match err {
            tally_core::Error::NotFound(msg) => Self::not_found(&msg),
            tally_core::Error::Conflict(msg) => Self::conflict(&msg),
            tally_core::Error::InvalidData(msg) => Self::bad_request(&msg),
            // Everything else is an unexpected failure, surfaced with the
            // underlying message per the propagation policy
            other => Self::internal(&other.to_string()),
        }
    }
}
