use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit_best_effort},
    domain::{order_status::OrderStatus, shipping::Destination},
    dto::orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::shipping_service,
    state::AppState,
};

/// A cart row joined with the product fields checkout needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: i64,
    pub stock: i32,
    pub weight_kg: f64,
}

/// Subtotal in cents and total weight in kg, after quantity and stock checks.
pub fn summarize_cart(lines: &[CartLine]) -> AppResult<(i64, f64)> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    let mut subtotal: i64 = 0;
    let mut weight = 0.0;
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        if line.stock < line.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                line.product_name
            )));
        }
        subtotal += line.price * i64::from(line.quantity);
        weight += line.weight_kg * f64::from(line.quantity);
    }
    Ok((subtotal, weight))
}

pub fn status_filter(raw: Option<&str>) -> AppResult<Option<OrderStatus>> {
    raw.filter(|s| !s.is_empty())
        .map(|s| s.parse::<OrderStatus>().map_err(AppError::BadRequest))
        .transpose()
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = status_filter(query.status.as_deref())? {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
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
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let destination = Destination::parse(payload.state_code.as_deref(), payload.cep.as_deref())?;

    let txn = state.orm.begin().await?;

    let cart = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let product_ids: Vec<Uuid> = cart.iter().map(|c| c.product_id).collect();
    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let lines = cart
        .iter()
        .map(|item| -> AppResult<CartLine> {
            let product = products.get(&item.product_id).ok_or_else(|| {
                AppError::BadRequest(format!("Product {} is no longer available", item.product_id))
            })?;
            Ok(CartLine {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity: item.quantity,
                price: product.price,
                stock: product.stock,
                weight_kg: product.weight_kg,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let (subtotal, weight) = summarize_cart(&lines)?;
    let quote = shipping_service::quote_destination(&txn, &destination, weight).await?;

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        subtotal_cents: Set(subtotal),
        shipping_cost_cents: Set(quote.cost_cents),
        total_amount: Set(subtotal + quote.cost_cents),
        status: Set(OrderStatus::Pending),
        invoice_number: Set(build_invoice_number(order_id)),
        shipping_state: Set(destination.state.clone()),
        shipping_cep: Set(destination.cep.clone()),
        delivery_days: Set(quote.delivery_days),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            product_name: Set(line.product_name.clone()),
            quantity: Set(line.quantity),
            price: Set(line.price),
            weight_kg: Set(line.weight_kg),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        order_items.push(OrderItem::from(item));

        // reduce stock
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(line.quantity))
            .filter(ProdCol::Id.eq(line.product_id))
            .exec(&txn)
            .await?;
    }

    // clear cart
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        total = order.total_amount,
        shipping = order.shipping_cost_cents,
        "order created"
    );

    log_audit_best_effort(
        &state.pool,
        Some(user.user_id),
        AuditAction::Checkout,
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse {
            order: Order::from(order),
            items: order_items,
            shipping: quote,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = load_items(state, order.id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn load_items(state: &AppState, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(items)
}

fn build_invoice_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    format!("INV-{}-{}", date, &suffix[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, price: i64, stock: i32, weight_kg: f64) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            product_name: "Camiseta".into(),
            quantity,
            price,
            stock,
            weight_kg,
        }
    }

    #[test]
    fn summarizes_subtotal_and_weight() {
        let (subtotal, weight) =
            summarize_cart(&[line(2, 1500, 10, 0.25), line(1, 4990, 1, 1.0)]).unwrap();
        assert_eq!(subtotal, 7990);
        assert!((weight - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_empty_and_overdrawn_carts() {
        assert!(matches!(summarize_cart(&[]), Err(AppError::BadRequest(_))));
        assert!(matches!(
            summarize_cart(&[line(3, 100, 2, 0.1)]),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            summarize_cart(&[line(0, 100, 2, 0.1)]),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn invoice_number_shape() {
        let invoice = build_invoice_number(Uuid::new_v4());
        assert!(invoice.starts_with("INV-"));
        assert_eq!(invoice.len(), "INV-20260101-ABCDEF12".len());
    }

    #[test]
    fn status_filter_parses_or_rejects() {
        assert_eq!(status_filter(None).unwrap(), None);
        assert_eq!(status_filter(Some("")).unwrap(), None);
        assert_eq!(status_filter(Some("shipped")).unwrap(), Some(OrderStatus::Shipped));
        assert!(status_filter(Some("lost")).is_err());
    }
}
