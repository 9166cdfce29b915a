use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit_best_effort},
    domain::order_status::{OrderStatus, Transition, transition},
    dto::orders::{OrderList, OrderWithItems, StatusUpdateResponse, UpdateOrderStatusRequest},
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    middleware::auth::AccessContext,
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::{load_items, status_filter},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    access: &AccessContext,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    access.require_admin()?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = status_filter(query.status.as_deref())? {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order_admin(
    state: &AppState,
    access: &AccessContext,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    access.require_admin()?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = load_items(state, order.id).await?;

    Ok(ApiResponse::success(
        "Order found",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Move an order to any status. Re-applying the current status is a no-op.
pub async fn update_order_status(
    state: &AppState,
    access: &AccessContext,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<StatusUpdateResponse>> {
    let actor = access.require_admin()?;
    let target: OrderStatus = payload.status.parse().map_err(AppError::BadRequest)?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let (from, to) = match transition(existing.status, target) {
        Transition::Unchanged => {
            tracing::debug!(order_id = %id, status = %target, "order status unchanged");
            return Ok(ApiResponse::success(
                "Order status unchanged",
                StatusUpdateResponse { success: true },
                Some(Meta::empty()),
            ));
        }
        Transition::Changed { from, to } => (from, to),
    };

    let mut active: OrderActive = existing.into();
    active.status = Set(to);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(
        order_id = %order.id,
        actor = %actor.id,
        from = %from,
        to = %to,
        "order status updated"
    );

    log_audit_best_effort(
        &state.pool,
        Some(actor.id),
        AuditAction::OrderStatusUpdate,
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "from": from.as_str(),
            "to": to.as_str(),
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        StatusUpdateResponse { success: true },
        Some(Meta::empty()),
    ))
}
