use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{domain::shipping::RegionType, models::ShippingConfig};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShippingQuoteRequest {
    pub state_code: Option<String>,
    pub cep: Option<String>,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShippingConfigRequest {
    pub name: String,
    pub region_type: RegionType,
    pub state_code: Option<String>,
    pub cep_prefix: Option<String>,
    pub cep_range_start: Option<i32>,
    pub cep_range_end: Option<i32>,
    pub base_cost_cents: i64,
    pub delivery_days: i32,
    #[serde(default)]
    pub weight_multiplier: f64,
    #[serde(default)]
    pub min_weight_kg: f64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub priority: i32,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShippingSettingsRequest {
    pub default_cost_cents: i64,
    pub default_delivery_days: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ShippingConfigList {
    #[schema(value_type = Vec<ShippingConfig>)]
    pub items: Vec<ShippingConfig>,
}
