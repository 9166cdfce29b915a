use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{order_status::OrderStatus, roles::Role, shipping::RegionType},
    entity::{
        cart_items, categories, order_items, orders, products, shipping_configs,
        shipping_settings, users,
    },
};

/// Public view of a user profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub weight_kg: f64,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtotal_cents: i64,
    pub shipping_cost_cents: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    /// Localized status for display, e.g. "Em produção".
    pub status_label: String,
    pub invoice_number: String,
    pub shipping_state: Option<String>,
    pub shipping_cep: Option<String>,
    pub delivery_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: i64,
    pub weight_kg: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingConfig {
    pub id: Uuid,
    pub name: String,
    pub region_type: RegionType,
    pub state_code: Option<String>,
    pub cep_prefix: Option<String>,
    pub cep_range_start: Option<i32>,
    pub cep_range_end: Option<i32>,
    pub base_cost_cents: i64,
    pub delivery_days: i32,
    pub weight_multiplier: f64,
    pub min_weight_kg: f64,
    pub active: bool,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingSettings {
    pub default_cost_cents: i64,
    pub default_delivery_days: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for Profile {
    fn from(model: users::Model) -> Self {
        Profile {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Category {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Product {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            stock: model.stock,
            weight_kg: model.weight_kg,
            category_id: model.category_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        CartItem {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Order {
            id: model.id,
            user_id: model.user_id,
            subtotal_cents: model.subtotal_cents,
            shipping_cost_cents: model.shipping_cost_cents,
            total_amount: model.total_amount,
            status: model.status,
            status_label: model.status.label().to_string(),
            invoice_number: model.invoice_number,
            shipping_state: model.shipping_state,
            shipping_cep: model.shipping_cep,
            delivery_days: model.delivery_days,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_name: model.product_name,
            quantity: model.quantity,
            price: model.price,
            weight_kg: model.weight_kg,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<shipping_configs::Model> for ShippingConfig {
    fn from(model: shipping_configs::Model) -> Self {
        ShippingConfig {
            id: model.id,
            name: model.name,
            region_type: model.region_type,
            state_code: model.state_code,
            cep_prefix: model.cep_prefix,
            cep_range_start: model.cep_range_start,
            cep_range_end: model.cep_range_end,
            base_cost_cents: model.base_cost_cents,
            delivery_days: model.delivery_days,
            weight_multiplier: model.weight_multiplier,
            min_weight_kg: model.min_weight_kg,
            active: model.active,
            priority: model.priority,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<shipping_settings::Model> for ShippingSettings {
    fn from(model: shipping_settings::Model) -> Self {
        ShippingSettings {
            default_cost_cents: model.default_cost_cents,
            default_delivery_days: model.default_delivery_days,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_view_carries_status_label() {
        let now = Utc::now().fixed_offset();
        let order = Order::from(orders::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            subtotal_cents: 2000,
            shipping_cost_cents: 1200,
            total_amount: 3200,
            status: OrderStatus::Production,
            invoice_number: "INV-20260101-ABCDEF12".into(),
            shipping_state: Some("SP".into()),
            shipping_cep: None,
            delivery_days: 4,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(order.status, OrderStatus::Production);
        assert_eq!(order.status_label, "Em produção");
    }
}
