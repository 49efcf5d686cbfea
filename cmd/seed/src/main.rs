//! Inserts demo accounts and prints a bearer token for each.
//!
//! Credential issuance is not part of the server, so this is how local
//! environments get callers to test with.

use anyhow::Context;
use auth_adapters::JwtAuthProvider;
use configs::Settings;
use domains::{Caller, User};
use secrecy::ExposeSecret;
use storage_adapters::postgres::{self, PgUserRepository};
use uuid::Uuid;

const DEMO_USERS: [(&str, &str, &str, bool); 3] = [
    ("admin", "Ada", "Admin", true),
    ("alice", "Alice", "Walker", false),
    ("bob", "Bob", "Hiker", false),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    let db = &settings.database;
    let pool = postgres::connect(db.url.expose_secret(), 2, db.acquire_timeout())
        .await
        .context("connecting to Postgres")?;
    postgres::migrate(&pool).await.context("running migrations")?;

    let users = PgUserRepository::new(pool);
    let auth = JwtAuthProvider::new(settings.auth.jwt_secret.expose_secret().as_bytes());
    let ttl = chrono::Duration::seconds(settings.auth.token_ttl_secs);

    for (username, first_name, last_name, admin) in DEMO_USERS {
        users
            .upsert(&User {
                id: Uuid::now_v7(),
                username: username.into(),
                first_name: first_name.into(),
                last_name: last_name.into(),
                admin,
            })
            .await
            .with_context(|| format!("seeding {username}"))?;

        // The row may predate this run, so read back the stored id.
        let stored = users
            .find_by_username(username)
            .await?
            .with_context(|| format!("{username} missing after upsert"))?;
        let token = auth
            .issue_token(&Caller::new(stored.id, stored.admin), ttl)
            .context("signing token")?;
        println!("{username:<6} {} admin={}\n  Bearer {token}", stored.id, stored.admin);
    }
    Ok(())
}
