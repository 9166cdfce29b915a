#![allow(dead_code)]

use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::Set;
use storefront_admin_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    domain::roles::Role,
    entity::users::ActiveModel as UserActive,
    middleware::auth::AccessContext,
    models::Profile,
    state::AppState,
};
use uuid::Uuid;

/// Connection string for DB-backed tests, or `None` to skip them.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            None
        }
    }
}

pub fn test_config(database_url: &str, storage_root: &std::path::Path) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        storage_root: storage_root.to_string_lossy().into_owned(),
        temp_upload_ttl_secs: 300,
        signed_url_ttl_secs: 3600,
        cron_secret: Some("cron-test".into()),
        max_body_bytes: 1024 * 1024,
    }
}

pub async fn setup_state(database_url: &str, storage_root: &std::path::Path) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    Ok(AppState::new(pool, test_config(database_url, storage_root)))
}

pub fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@example.com", Uuid::new_v4().simple())
}

pub async fn create_user(state: &AppState, role: Role, tag: &str) -> anyhow::Result<Profile> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(unique_email(tag)),
        full_name: Set(Some(format!("{tag} tester"))),
        password_hash: Set("dummy".into()),
        role: Set(role),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(Profile::from(user))
}

pub async fn access_for(state: &AppState, role: Role, tag: &str) -> anyhow::Result<AccessContext> {
    Ok(AccessContext::for_profile(create_user(state, role, tag).await?))
}
