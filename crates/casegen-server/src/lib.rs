pub mod auth;
pub mod embed;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

pub use state::{AppState, PendingEmail, Services};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let signed_in = Router::new()
        .route("/api/auth/sign-out", post(routes::auth::sign_out))
        .route("/api/session", get(routes::meta::session))
        .route("/api/prompt", post(routes::meta::prompt))
        .route("/api/generate", post(routes::generate::generate))
        .route("/api/projects", get(routes::projects::list_projects))
        .route(
            "/api/projects/{title}/{timestamp}",
            get(routes::projects::get_project),
        )
        .route(
            "/api/projects/{title}/{timestamp}/download",
            get(routes::projects::download_project),
        )
        .route(
            "/api/projects/{title}/{timestamp}/share",
            get(routes::projects::share_project),
        )
        .route(
            "/api/projects/{title}/{timestamp}/email",
            post(routes::projects::email_project),
        )
        .route("/api/search", get(routes::search::search))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/api/auth/sign-in", post(routes::auth::sign_in))
        .route("/api/auth/sign-up", post(routes::auth::sign_up))
        .route("/api/options", get(routes::meta::options))
        .merge(signed_in)
        .fallback(embed::static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Serve the web UI on a pre-bound listener until the process is stopped.
///
/// Taking a bound `TcpListener` lets the caller read the actual port first
/// (useful when `port = 0` and the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("casegen UI listening on http://localhost:{port}");

    if open_browser {
        let url = format!("http://localhost:{port}");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open a browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
