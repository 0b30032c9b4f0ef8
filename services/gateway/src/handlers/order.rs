use crate::error::AppError;
use crate::models::{LimitOrderRequest, OrderFulfilledResponse};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, warn};

/// Execute a limit order against the live depth stream and report the fills
pub async fn create_limit_order(
    State(state): State<AppState>,
    payload: Result<Json<LimitOrderRequest>, JsonRejection>,
) -> Result<Json<OrderFulfilledResponse>, AppError> {
    // 1. Validate the request
    let Json(request) = payload?;
    let order = request.into_order()?;

    // 2. Throttle per symbol; each execution holds an exchange stream open
    state.rate_limiter.check_rate_limit(order.symbol().as_str())?;

    // 3. Execute
    let outcome = state
        .engine
        .execute(order.clone(), state.order_timeout_secs)
        .await;

    if !outcome.fulfilled {
        if let Some(err) = outcome.error {
            return Err(AppError::ExecutionFailed {
                message: err.to_string(),
                fills: outcome.fills,
            });
        }
        return Err(AppError::NotFulfilled {
            fills: outcome.fills,
        });
    }

    // A stream error after completion does not undo the fills
    if let Some(err) = &outcome.error {
        warn!(error = %err, "Order fulfilled despite stream error");
    }

    // 4. Persist
    let order_id = match &state.database {
        Some(db) => Some(
            db.persist_fulfilled_order(&order, &outcome.fills)
                .await
                .map_err(anyhow::Error::from)?,
        ),
        None => None,
    };

    info!(symbol = %order.symbol(), ?order_id, fills = outcome.fills.len(), "Order fulfilled");

    Ok(Json(OrderFulfilledResponse::new(order_id, outcome.fills)))
}
