use axum::{Json, Router, extract::State, routing::post};

use crate::{
    domain::shipping::ShippingQuote, dto::shipping::ShippingQuoteRequest, error::AppResult,
    response::ApiResponse, services::shipping_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/quote", post(quote))
}

#[utoipa::path(
    post,
    path = "/api/shipping/quote",
    request_body = ShippingQuoteRequest,
    responses(
        (status = 200, description = "Resolved shipping cost and delivery time", body = ApiResponse<ShippingQuote>),
        (status = 400, description = "Missing or invalid destination, or invalid weight"),
        (status = 500, description = "No rule matched and no default is configured")
    ),
    tag = "Shipping"
)]
pub async fn quote(
    State(state): State<AppState>,
    Json(payload): Json<ShippingQuoteRequest>,
) -> AppResult<Json<ApiResponse<ShippingQuote>>> {
    let resp = shipping_service::quote(&state, payload).await?;
    Ok(Json(resp))
}
