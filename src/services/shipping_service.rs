use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit_best_effort},
    domain::shipping::{
        self, DefaultShipping, Destination, ShippingQuote, ShippingRule, normalize_state,
    },
    dto::shipping::{
        ShippingConfigList, ShippingConfigRequest, ShippingQuoteRequest,
        UpdateShippingSettingsRequest,
    },
    entity::{
        shipping_configs::{
            ActiveModel as ConfigActive, Column as ConfigCol, Entity as ShippingConfigs,
        },
        shipping_settings::{ActiveModel as SettingsActive, Entity as ShippingSettingsEntity},
    },
    error::{AppError, AppResult},
    middleware::auth::AccessContext,
    models::{ShippingConfig, ShippingSettings},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const SETTINGS_ROW_ID: i32 = 1;

/// Every stored rule, in evaluation order.
pub async fn load_rules<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<ShippingRule>> {
    let rules = ShippingConfigs::find()
        .order_by_desc(ConfigCol::Priority)
        .order_by_asc(ConfigCol::Name)
        .all(conn)
        .await?
        .iter()
        .map(ShippingRule::from)
        .collect();
    Ok(rules)
}

pub async fn load_default<C: ConnectionTrait>(conn: &C) -> AppResult<Option<DefaultShipping>> {
    let settings = ShippingSettingsEntity::find_by_id(SETTINGS_ROW_ID)
        .one(conn)
        .await?;
    Ok(settings.as_ref().map(DefaultShipping::from))
}

pub async fn quote_destination<C: ConnectionTrait>(
    conn: &C,
    destination: &Destination,
    weight_kg: f64,
) -> AppResult<ShippingQuote> {
    let rules = load_rules(conn).await?;
    let default = load_default(conn).await?;
    let quote = shipping::resolve(&rules, default, destination, weight_kg).map_err(|err| {
        if matches!(err, shipping::ShippingError::NotConfigured) {
            tracing::error!("shipping settings missing; cannot quote");
        }
        AppError::from(err)
    })?;
    tracing::debug!(
        source = ?quote.source,
        config = ?quote.config_name,
        cost_cents = quote.cost_cents,
        "shipping resolved"
    );
    Ok(quote)
}

pub async fn quote(
    state: &AppState,
    payload: ShippingQuoteRequest,
) -> AppResult<ApiResponse<ShippingQuote>> {
    let destination = Destination::parse(payload.state_code.as_deref(), payload.cep.as_deref())?;
    let quote = quote_destination(&state.orm, &destination, payload.weight_kg).await?;
    Ok(ApiResponse::success("Shipping quote", quote, Some(Meta::empty())))
}

/// Normalize and validate an admin-submitted rule.
pub fn rule_from_request(id: Uuid, payload: &ShippingConfigRequest) -> AppResult<ShippingRule> {
    let state_code = payload
        .state_code
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(normalize_state)
        .transpose()?;
    let cep_prefix = payload
        .cep_prefix
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let rule = ShippingRule {
        id,
        name: payload.name.trim().to_string(),
        region_type: payload.region_type,
        state_code,
        cep_prefix,
        cep_range_start: payload.cep_range_start,
        cep_range_end: payload.cep_range_end,
        base_cost_cents: payload.base_cost_cents,
        delivery_days: payload.delivery_days,
        weight_multiplier: payload.weight_multiplier,
        min_weight_kg: payload.min_weight_kg,
        active: payload.active,
        priority: payload.priority,
    };
    rule.validate()?;
    Ok(rule)
}

pub async fn list_configs(
    state: &AppState,
    access: &AccessContext,
) -> AppResult<ApiResponse<ShippingConfigList>> {
    access.require_admin()?;
    let items = ShippingConfigs::find()
        .order_by_desc(ConfigCol::Priority)
        .order_by_asc(ConfigCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ShippingConfig::from)
        .collect();
    Ok(ApiResponse::success(
        "Shipping configs",
        ShippingConfigList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_config(
    state: &AppState,
    access: &AccessContext,
    payload: ShippingConfigRequest,
) -> AppResult<ApiResponse<ShippingConfig>> {
    let actor = access.require_admin()?;
    let rule = rule_from_request(Uuid::new_v4(), &payload)?;

    let active = ConfigActive {
        id: Set(rule.id),
        name: Set(rule.name),
        region_type: Set(rule.region_type),
        state_code: Set(rule.state_code),
        cep_prefix: Set(rule.cep_prefix),
        cep_range_start: Set(rule.cep_range_start),
        cep_range_end: Set(rule.cep_range_end),
        base_cost_cents: Set(rule.base_cost_cents),
        delivery_days: Set(rule.delivery_days),
        weight_multiplier: Set(rule.weight_multiplier),
        min_weight_kg: Set(rule.min_weight_kg),
        active: Set(rule.active),
        priority: Set(rule.priority),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let config = active.insert(&state.orm).await?;

    log_audit_best_effort(
        &state.pool,
        Some(actor.id),
        AuditAction::ShippingConfigCreate,
        "shipping_configs",
        serde_json::json!({ "config_id": config.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Shipping config created",
        ShippingConfig::from(config),
        Some(Meta::empty()),
    ))
}

pub async fn update_config(
    state: &AppState,
    access: &AccessContext,
    id: Uuid,
    payload: ShippingConfigRequest,
) -> AppResult<ApiResponse<ShippingConfig>> {
    let actor = access.require_admin()?;
    let rule = rule_from_request(id, &payload)?;

    let existing = ShippingConfigs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ConfigActive = existing.into();
    active.name = Set(rule.name);
    active.region_type = Set(rule.region_type);
    active.state_code = Set(rule.state_code);
    active.cep_prefix = Set(rule.cep_prefix);
    active.cep_range_start = Set(rule.cep_range_start);
    active.cep_range_end = Set(rule.cep_range_end);
    active.base_cost_cents = Set(rule.base_cost_cents);
    active.delivery_days = Set(rule.delivery_days);
    active.weight_multiplier = Set(rule.weight_multiplier);
    active.min_weight_kg = Set(rule.min_weight_kg);
    active.active = Set(rule.active);
    active.priority = Set(rule.priority);
    active.updated_at = Set(Utc::now().into());
    let config = active.update(&state.orm).await?;

    log_audit_best_effort(
        &state.pool,
        Some(actor.id),
        AuditAction::ShippingConfigUpdate,
        "shipping_configs",
        serde_json::json!({ "config_id": config.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Shipping config updated",
        ShippingConfig::from(config),
        Some(Meta::empty()),
    ))
}

pub async fn delete_config(
    state: &AppState,
    access: &AccessContext,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let actor = access.require_delete()?;
    let result = ShippingConfigs::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_best_effort(
        &state.pool,
        Some(actor.id),
        AuditAction::ShippingConfigDelete,
        "shipping_configs",
        serde_json::json!({ "config_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn get_settings(
    state: &AppState,
    access: &AccessContext,
) -> AppResult<ApiResponse<ShippingSettings>> {
    access.require_admin()?;
    let settings = ShippingSettingsEntity::find_by_id(SETTINGS_ROW_ID)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Shipping settings",
        ShippingSettings::from(settings),
        Some(Meta::empty()),
    ))
}

/// Create or replace the single default-shipping row.
pub async fn update_settings(
    state: &AppState,
    access: &AccessContext,
    payload: UpdateShippingSettingsRequest,
) -> AppResult<ApiResponse<ShippingSettings>> {
    let actor = access.require_admin()?;
    if payload.default_cost_cents < 0 || payload.default_delivery_days < 0 {
        return Err(AppError::BadRequest(
            "default cost and delivery days must not be negative".into(),
        ));
    }

    let existing = ShippingSettingsEntity::find_by_id(SETTINGS_ROW_ID)
        .one(&state.orm)
        .await?;
    let settings = match existing {
        Some(model) => {
            let mut active: SettingsActive = model.into();
            active.default_cost_cents = Set(payload.default_cost_cents);
            active.default_delivery_days = Set(payload.default_delivery_days);
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => {
            SettingsActive {
                id: Set(SETTINGS_ROW_ID),
                default_cost_cents: Set(payload.default_cost_cents),
                default_delivery_days: Set(payload.default_delivery_days),
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    log_audit_best_effort(
        &state.pool,
        Some(actor.id),
        AuditAction::ShippingSettingsUpdate,
        "shipping_settings",
        serde_json::json!({
            "default_cost_cents": settings.default_cost_cents,
            "default_delivery_days": settings.default_delivery_days,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Shipping settings updated",
        ShippingSettings::from(settings),
        Some(Meta::empty()),
    ))
}
