use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post, put},
};
use uuid::Uuid;

use crate::{
    domain::assets::CleanupReport,
    dto::{
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        orders::{OrderList, OrderWithItems, StatusUpdateResponse, UpdateOrderStatusRequest},
        shipping::{ShippingConfigList, ShippingConfigRequest, UpdateShippingSettingsRequest},
        users::{UpdateRoleRequest, UpdateRoleResponse, UserList},
    },
    error::AppResult,
    middleware::auth::AccessContext,
    models::{Category, ShippingConfig, ShippingSettings},
    response::ApiResponse,
    routes::params::{OrderListQuery, UserListQuery},
    services::{
        admin_service, category_service, shipping_service,
        storage_service::{self, CRON_SECRET_HEADER},
        user_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/users", get(list_users))
        .route("/users/role", post(update_role))
        .route("/shipping", get(list_shipping_configs).post(create_shipping_config))
        .route(
            "/shipping/settings",
            get(get_shipping_settings).put(update_shipping_settings),
        )
        .route(
            "/shipping/{id}",
            put(update_shipping_config).delete(delete_shipping_config),
        )
        .route("/categories", post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/storage/cleanup", post(cleanup_storage))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Get all orders (admin only)", body = ApiResponse<OrderList>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    access: AccessContext,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &access, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Get any order with items (admin only)", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    access: AccessContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = admin_service::get_order_admin(&state, &access, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status set (no-op when unchanged)", body = ApiResponse<StatusUpdateResponse>),
        (status = 400, description = "Invalid status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    access: AccessContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<StatusUpdateResponse>>> {
    let resp = admin_service::update_order_status(&state, &access, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("q" = Option<String>, Query, description = "Search email or name")
    ),
    responses(
        (status = 200, description = "List profiles", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    access: AccessContext,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state, &access, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/role",
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<UpdateRoleResponse>),
        (status = 400, description = "Invalid role or superadmin self-change"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden or superadmin assignment"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_role(
    State(state): State<AppState>,
    access: AccessContext,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<UpdateRoleResponse>>> {
    let resp = user_service::update_role(&state, &access, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/shipping",
    responses(
        (status = 200, description = "Shipping rules in evaluation order", body = ApiResponse<ShippingConfigList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_shipping_configs(
    State(state): State<AppState>,
    access: AccessContext,
) -> AppResult<Json<ApiResponse<ShippingConfigList>>> {
    let resp = shipping_service::list_configs(&state, &access).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/shipping",
    request_body = ShippingConfigRequest,
    responses(
        (status = 201, description = "Shipping rule created", body = ApiResponse<ShippingConfig>),
        (status = 400, description = "Invalid rule"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_shipping_config(
    State(state): State<AppState>,
    access: AccessContext,
    Json(payload): Json<ShippingConfigRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ShippingConfig>>)> {
    let resp = shipping_service::create_config(&state, &access, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/shipping/{id}",
    params(
        ("id" = Uuid, Path, description = "Shipping rule ID")
    ),
    request_body = ShippingConfigRequest,
    responses(
        (status = 200, description = "Shipping rule updated", body = ApiResponse<ShippingConfig>),
        (status = 400, description = "Invalid rule"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_shipping_config(
    State(state): State<AppState>,
    access: AccessContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShippingConfigRequest>,
) -> AppResult<Json<ApiResponse<ShippingConfig>>> {
    let resp = shipping_service::update_config(&state, &access, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/shipping/{id}",
    params(
        ("id" = Uuid, Path, description = "Shipping rule ID")
    ),
    responses(
        (status = 200, description = "Shipping rule deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_shipping_config(
    State(state): State<AppState>,
    access: AccessContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = shipping_service::delete_config(&state, &access, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/shipping/settings",
    responses(
        (status = 200, description = "Default shipping", body = ApiResponse<ShippingSettings>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not configured")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_shipping_settings(
    State(state): State<AppState>,
    access: AccessContext,
) -> AppResult<Json<ApiResponse<ShippingSettings>>> {
    let resp = shipping_service::get_settings(&state, &access).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/shipping/settings",
    request_body = UpdateShippingSettingsRequest,
    responses(
        (status = 200, description = "Default shipping saved", body = ApiResponse<ShippingSettings>),
        (status = 400, description = "Invalid settings"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_shipping_settings(
    State(state): State<AppState>,
    access: AccessContext,
    Json(payload): Json<UpdateShippingSettingsRequest>,
) -> AppResult<Json<ApiResponse<ShippingSettings>>> {
    let resp = shipping_service::update_settings(&state, &access, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 400, description = "Invalid or duplicate slug"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    access: AccessContext,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::create_category(&state, &access, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 400, description = "Invalid or duplicate slug"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_category(
    State(state): State<AppState>,
    access: AccessContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update_category(&state, &access, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    access: AccessContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = category_service::delete_category(&state, &access, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/storage/cleanup",
    params(
        ("x-cron-secret" = Option<String>, Header, description = "Shared secret for scheduled runs")
    ),
    responses(
        (status = 200, description = "Expired temporary objects removed", body = ApiResponse<CleanupReport>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn cleanup_storage(
    State(state): State<AppState>,
    access: AccessContext,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<CleanupReport>>> {
    let cron_secret = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    let resp = storage_service::cleanup(&state, &access, cron_secret).await?;
    Ok(Json(resp))
}
