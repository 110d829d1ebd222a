use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use vitalog_api::config;
use vitalog_api::database::manager::DatabaseManager;
use vitalog_api::handlers;
use vitalog_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting vitalog API in {:?} mode", config.environment);

    if config.database.run_migrations_on_start {
        if let Err(e) = DatabaseManager::migrate().await {
            // /health keeps reporting degraded until the database comes back
            tracing::warn!("migrations not applied at startup: {}", e);
        }
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("VITALOG_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("vitalog API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Token acquisition, default catalog reads and shared taxonomies.
fn public_routes() -> Router {
    use axum::routing::post;
    use handlers::{auth, body_parts, exercises, http_refs, mentals, nutritions, workouts};

    Router::new()
        .route("/api/v1/users/signup", post(auth::signup))
        .route("/api/v1/users/auth/login", post(auth::login))
        // Default flavor, readable without authentication
        .route("/api/v1/workouts/http-refs/default", get(http_refs::list_default))
        .route("/api/v1/workouts/http-refs/default/:id", get(http_refs::get_default))
        .route("/api/v1/workouts/exercises/default", get(exercises::list_default))
        .route("/api/v1/workouts/exercises/default/:id", get(exercises::get_default))
        .route("/api/v1/workouts/default", get(workouts::list_default))
        .route("/api/v1/workouts/default/:id", get(workouts::get_default))
        .route("/api/v1/mentals/activities/default", get(mentals::list_default_activities))
        .route("/api/v1/mentals/activities/default/:id", get(mentals::get_default_activity))
        .route("/api/v1/mentals/workouts/default", get(mentals::list_default_workouts))
        .route("/api/v1/mentals/workouts/default/:id", get(mentals::get_default_workout))
        .route("/api/v1/nutritions/default", get(nutritions::list_default))
        .route("/api/v1/nutritions/default/:id", get(nutritions::get_default))
        // Shared taxonomies
        .route("/api/v1/workouts/body-parts", get(body_parts::list))
        .route("/api/v1/mentals/types", get(mentals::list_types))
        .route("/api/v1/nutritions/types", get(nutritions::list_types))
}

/// Everything that creates, reads or mutates user-owned resources.
fn protected_routes() -> Router {
    use axum::routing::{get, post};
    use handlers::{exercises, http_refs, mentals, nutritions, workouts};

    Router::new()
        .route(
            "/api/v1/workouts/http-refs",
            post(http_refs::create).get(http_refs::list),
        )
        .route(
            "/api/v1/workouts/http-refs/:id",
            get(http_refs::get_custom)
                .patch(http_refs::update)
                .delete(http_refs::delete),
        )
        .route(
            "/api/v1/workouts/exercises",
            post(exercises::create).get(exercises::list),
        )
        .route(
            "/api/v1/workouts/exercises/:id",
            get(exercises::get_custom)
                .patch(exercises::update)
                .delete(exercises::delete),
        )
        .route("/api/v1/workouts", post(workouts::create).get(workouts::list))
        .route(
            "/api/v1/workouts/:id",
            get(workouts::get_custom)
                .patch(workouts::update)
                .delete(workouts::delete),
        )
        .route(
            "/api/v1/mentals/activities",
            post(mentals::create_activity).get(mentals::list_activities),
        )
        .route(
            "/api/v1/mentals/activities/:id",
            get(mentals::get_custom_activity)
                .patch(mentals::update_activity)
                .delete(mentals::delete_activity),
        )
        .route(
            "/api/v1/mentals/workouts",
            post(mentals::create_workout).get(mentals::list_workouts),
        )
        .route(
            "/api/v1/mentals/workouts/:id",
            get(mentals::get_custom_workout)
                .patch(mentals::update_workout)
                .delete(mentals::delete_workout),
        )
        .route(
            "/api/v1/nutritions",
            post(nutritions::create).get(nutritions::list),
        )
        .route(
            "/api/v1/nutritions/:id",
            get(nutritions::get_custom)
                .patch(nutritions::update)
                .delete(nutritions::delete),
        )
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "vitalog API",
        "version": version,
        "description": "Healthy-lifestyle activity catalog backend",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "signup": "/api/v1/users/signup (public)",
            "login": "/api/v1/users/auth/login (public)",
            "http_refs": "/api/v1/workouts/http-refs[/:id] (protected), /api/v1/workouts/http-refs/default[/:id] (public)",
            "exercises": "/api/v1/workouts/exercises[/:id] (protected), /api/v1/workouts/exercises/default[/:id] (public)",
            "workouts": "/api/v1/workouts[/:id] (protected), /api/v1/workouts/default[/:id] (public)",
            "mental_activities": "/api/v1/mentals/activities[/:id] (protected), /api/v1/mentals/activities/default[/:id] (public)",
            "mental_workouts": "/api/v1/mentals/workouts[/:id] (protected), /api/v1/mentals/workouts/default[/:id] (public)",
            "nutritions": "/api/v1/nutritions[/:id] (protected), /api/v1/nutritions/default[/:id] (public)",
            "taxonomies": "/api/v1/workouts/body-parts, /api/v1/mentals/types, /api/v1/nutritions/types (public)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
