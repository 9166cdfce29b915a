use sea_orm::entity::prelude::*;

use crate::domain::shipping::DefaultShipping;

/// Single-row table holding the store-wide fallback quote.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shipping_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub default_cost_cents: i64,
    pub default_delivery_days: i32,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for DefaultShipping {
    fn from(model: &Model) -> Self {
        DefaultShipping {
            cost_cents: model.default_cost_cents,
            delivery_days: model.default_delivery_days,
        }
    }
}
