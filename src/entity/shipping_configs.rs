use sea_orm::entity::prelude::*;

use crate::domain::shipping::{RegionType, ShippingRule};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shipping_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
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
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for ShippingRule {
    fn from(model: &Model) -> Self {
        ShippingRule {
            id: model.id,
            name: model.name.clone(),
            region_type: model.region_type,
            state_code: model.state_code.clone(),
            cep_prefix: model.cep_prefix.clone(),
            cep_range_start: model.cep_range_start,
            cep_range_end: model.cep_range_end,
            base_cost_cents: model.base_cost_cents,
            delivery_days: model.delivery_days,
            weight_multiplier: model.weight_multiplier,
            min_weight_kg: model.min_weight_kg,
            active: model.active,
            priority: model.priority,
        }
    }
}
