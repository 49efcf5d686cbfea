//! Shared fixtures for the integration suites.

use std::sync::Arc;

use domains::{CommentDraft, NewSite, Rating, Site, User};
use storage_adapters::{InMemorySiteRepository, InMemoryUserRepository};
use uuid::Uuid;

#[cfg(feature = "web-axum")]
pub use web::{TestApp, TestResponse, TestUser};

pub fn user(username: &str, admin: bool) -> User {
    User {
        id: Uuid::now_v7(),
        username: username.into(),
        first_name: username.to_uppercase(),
        last_name: "Tester".into(),
        admin,
    }
}

pub fn new_site(name: &str) -> NewSite {
    NewSite {
        name: name.into(),
        description: format!("{name} campground"),
        ..Default::default()
    }
}

pub fn draft(rating: u8, text: &str) -> CommentDraft {
    CommentDraft {
        rating: Rating::new(rating).expect("fixture rating in range"),
        text: text.into(),
    }
}

/// In-memory stores pre-populated with one site.
pub async fn seeded_stores(
    name: &str,
) -> (Arc<InMemorySiteRepository>, Arc<InMemoryUserRepository>, Site) {
    use domains::SiteRepository;

    let sites = Arc::new(InMemorySiteRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let site = sites
        .create(Site::from_new(new_site(name), chrono::Utc::now()))
        .await
        .expect("seed site");
    (sites, users, site)
}

#[cfg(feature = "web-axum")]
mod web {
    use std::sync::Arc;

    use api_adapters::metrics::Metrics;
    use api_adapters::{router, AppState};
    use auth_adapters::JwtAuthProvider;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use domains::Caller;
    use serde_json::Value;
    use services::SiteService;
    use storage_adapters::{InMemorySiteRepository, InMemoryUserRepository};
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &[u8] = b"integration-suite-secret-0123456789";

    pub struct TestUser {
        pub id: Uuid,
        pub token: String,
    }

    #[derive(Debug)]
    pub struct TestResponse {
        pub status: StatusCode,
        pub body: Value,
    }

    /// The full router over fresh in-memory stores.
    pub struct TestApp {
        pub router: Router,
        pub sites: Arc<InMemorySiteRepository>,
        pub users: Arc<InMemoryUserRepository>,
        issuer: JwtAuthProvider,
    }

    impl TestApp {
        pub fn new() -> Self {
            let sites = Arc::new(InMemorySiteRepository::new());
            let users = Arc::new(InMemoryUserRepository::new());
            let state = AppState {
                sites: SiteService::new(sites.clone(), users.clone()),
                auth: Arc::new(JwtAuthProvider::new(SECRET)),
                metrics: Arc::new(Metrics::new()),
                expose_error_detail: false,
            };
            Self {
                router: router(state),
                sites,
                users,
                issuer: JwtAuthProvider::new(SECRET),
            }
        }

        /// Stores an account and mints a bearer token for it.
        pub fn register(&self, username: &str, admin: bool) -> TestUser {
            let user = crate::user(username, admin);
            let id = user.id;
            self.users.insert(user);
            let token = self
                .issuer
                .issue_token(&Caller::new(id, admin), chrono::Duration::hours(1))
                .expect("sign test token");
            TestUser { id, token }
        }

        pub async fn request(
            &self,
            method: Method,
            uri: &str,
            caller: Option<&TestUser>,
            body: Option<Value>,
        ) -> TestResponse {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(caller) = caller {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", caller.token));
            }
            let request = match body {
                Some(json) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string())),
                None => builder.body(Body::empty()),
            }
            .expect("valid request");

            let response = self
                .router
                .clone()
                .oneshot(request)
                .await
                .expect("router is infallible");
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("read body");
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            TestResponse { status, body }
        }
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self::new()
        }
    }
}
