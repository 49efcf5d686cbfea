//! # api-adapters
//!
//! The HTTP routing and orchestration layer for SiteBoard.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;

#[cfg(feature = "web-axum")]
pub use web::{router, AppState};

#[cfg(feature = "web-axum")]
mod web {
    use std::sync::Arc;

    use axum::routing::get;
    use axum::Router;
    use domains::AuthProvider;
    use services::SiteService;

    use crate::handlers;
    use crate::metrics::Metrics;
    use crate::middleware;

    /// Everything a handler needs, assembled once at startup.
    #[derive(Clone)]
    pub struct AppState {
        pub sites: SiteService,
        pub auth: Arc<dyn AuthProvider>,
        pub metrics: Arc<Metrics>,
        /// Include diagnostic `detail` in error bodies (never in production).
        pub expose_error_detail: bool,
    }

    /// Builds the full application router.
    ///
    /// The binary mounts this at `/`; tests drive it directly.
    pub fn router(state: AppState) -> Router {
        let routes = Router::new()
            .route(
                "/sites",
                get(handlers::list_sites)
                    .post(handlers::create_site)
                    .put(handlers::update_sites)
                    .delete(handlers::delete_all_sites),
            )
            .route(
                "/sites/{site_id}",
                get(handlers::get_site)
                    .post(handlers::post_site)
                    .put(handlers::update_site)
                    .delete(handlers::delete_site),
            )
            .route(
                "/sites/{site_id}/comments",
                get(handlers::list_comments)
                    .post(handlers::add_comment)
                    .put(handlers::update_comments)
                    .delete(handlers::delete_all_comments),
            )
            .route(
                "/sites/{site_id}/comments/{comment_id}",
                get(handlers::get_comment)
                    .post(handlers::post_comment)
                    .put(handlers::update_comment)
                    .delete(handlers::delete_comment),
            )
            .route("/health", get(handlers::health))
            .route("/metrics", get(handlers::metrics))
            .fallback(handlers::fallback)
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::attach_error_detail,
            ))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::track_requests,
            ))
            .with_state(state);

        middleware::with_standard_layers(routes)
    }
}
