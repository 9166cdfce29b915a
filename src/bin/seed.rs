use storefront_admin_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    domain::{roles::Role, shipping::RegionType},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let superadmin_id =
        ensure_user_with_role(&pool, "superadmin@example.com", "superadmin123", Role::Superadmin)
            .await?;
    let admin_id = ensure_user_with_role(&pool, "admin@example.com", "admin1234", Role::Admin).await?;
    let user_id = ensure_user_with_role(&pool, "user@example.com", "user1234", Role::User).await?;
    let category_id = seed_category(&pool).await?;
    seed_products(&pool, category_id).await?;
    seed_shipping(&pool).await?;

    println!(
        "Seed completed. Superadmin ID: {superadmin_id}, Admin ID: {admin_id}, User ID: {user_id}"
    );
    Ok(())
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_category(pool: &sqlx::PgPool) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug, description)
        VALUES ($1, 'Vestuário', 'vestuario', 'Camisetas e moletons')
        ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, category_id: Uuid) -> anyhow::Result<()> {
    let products = vec![
        ("Moletom Ferris", "Moletom quente para Rustaceans", 18990_i64, 50, 0.8),
        ("Caneca Ferris", "Café fica melhor com o Ferris", 4990, 100, 0.4),
        ("Kit de Adesivos", "Decore seu notebook", 1990, 200, 0.05),
        ("Camiseta Async", "Algodão, estampa async/await", 7990, 75, 0.25),
    ];

    for (name, desc, price, stock, weight_kg) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, stock, weight_kg, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(stock)
        .bind(weight_kg)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

struct SeedRule {
    name: &'static str,
    region_type: RegionType,
    state_code: Option<&'static str>,
    cep_prefix: Option<&'static str>,
    cep_range: Option<(i32, i32)>,
    base_cost_cents: i64,
    delivery_days: i32,
    weight_multiplier: f64,
    priority: i32,
}

async fn seed_shipping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shipping_configs")
        .fetch_one(pool)
        .await?;

    if existing.0 == 0 {
        let rules = [
            SeedRule {
                name: "Retirada local",
                region_type: RegionType::SameCep,
                state_code: None,
                cep_prefix: Some("01310"),
                cep_range: None,
                base_cost_cents: 0,
                delivery_days: 1,
                weight_multiplier: 0.0,
                priority: 100,
            },
            SeedRule {
                name: "Grande São Paulo",
                region_type: RegionType::MetroSp,
                state_code: Some("SP"),
                cep_prefix: None,
                cep_range: Some((1000000, 9999999)),
                base_cost_cents: 1500,
                delivery_days: 2,
                weight_multiplier: 0.1,
                priority: 50,
            },
            SeedRule {
                name: "Interior de SP",
                region_type: RegionType::SpState,
                state_code: Some("SP"),
                cep_prefix: None,
                cep_range: None,
                base_cost_cents: 2500,
                delivery_days: 4,
                weight_multiplier: 0.15,
                priority: 20,
            },
            SeedRule {
                name: "Demais estados",
                region_type: RegionType::OtherStates,
                state_code: None,
                cep_prefix: None,
                cep_range: None,
                base_cost_cents: 4000,
                delivery_days: 8,
                weight_multiplier: 0.2,
                priority: 0,
            },
        ];

        for rule in rules {
            sqlx::query(
                r#"
                INSERT INTO shipping_configs (
                    id, name, region_type, state_code, cep_prefix, cep_range_start, cep_range_end,
                    base_cost_cents, delivery_days, weight_multiplier, min_weight_kg, active, priority
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 1.0, TRUE, $11)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(rule.name)
            .bind(rule.region_type.as_str())
            .bind(rule.state_code)
            .bind(rule.cep_prefix)
            .bind(rule.cep_range.map(|r| r.0))
            .bind(rule.cep_range.map(|r| r.1))
            .bind(rule.base_cost_cents)
            .bind(rule.delivery_days)
            .bind(rule.weight_multiplier)
            .bind(rule.priority)
            .execute(pool)
            .await?;
        }
    }

    sqlx::query(
        r#"
        INSERT INTO shipping_settings (id, default_cost_cents, default_delivery_days)
        VALUES (1, 5000, 10)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .execute(pool)
    .await?;

    println!("Seeded shipping rules and defaults");
    Ok(())
}
