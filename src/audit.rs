use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    RoleUpdate,
    ProductCreate,
    ProductUpdate,
    ProductDelete,
    CategoryCreate,
    CategoryUpdate,
    CategoryDelete,
    Checkout,
    OrderStatusUpdate,
    ShippingConfigCreate,
    ShippingConfigUpdate,
    ShippingConfigDelete,
    ShippingSettingsUpdate,
    StorageCleanup,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserLogin => "user_login",
            AuditAction::RoleUpdate => "role_update",
            AuditAction::ProductCreate => "product_create",
            AuditAction::ProductUpdate => "product_update",
            AuditAction::ProductDelete => "product_delete",
            AuditAction::CategoryCreate => "category_create",
            AuditAction::CategoryUpdate => "category_update",
            AuditAction::CategoryDelete => "category_delete",
            AuditAction::Checkout => "checkout",
            AuditAction::OrderStatusUpdate => "order_status_update",
            AuditAction::ShippingConfigCreate => "shipping_config_create",
            AuditAction::ShippingConfigUpdate => "shipping_config_update",
            AuditAction::ShippingConfigDelete => "shipping_config_delete",
            AuditAction::ShippingSettingsUpdate => "shipping_settings_update",
            AuditAction::StorageCleanup => "storage_cleanup",
        }
    }
}

pub async fn log_audit(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: AuditAction,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(action.as_str())
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Audit writes never fail the request that triggered them.
pub async fn log_audit_best_effort(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: AuditAction,
    resource: &str,
    metadata: Value,
) {
    if let Err(err) = log_audit(pool, user_id, action, Some(resource), Some(metadata)).await {
        tracing::warn!(error = %err, action = action.as_str(), "audit log failed");
    }
}
