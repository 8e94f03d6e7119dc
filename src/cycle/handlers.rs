use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use tracing::{debug, instrument};

use crate::cycle::dto::{PeriodTrackerRequest, PeriodTrackerResponse};
use crate::cycle::predictor::predict;
use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn cycle_routes() -> Router<AppState> {
    Router::new().route("/period-tracker", post(period_tracker))
}

#[instrument(skip(payload))]
pub async fn period_tracker(
    payload: Result<Json<PeriodTrackerRequest>, JsonRejection>,
) -> AppResult<ApiResponse<PeriodTrackerResponse>> {
    let Json(payload) =
        payload.map_err(|e| AppError::Validation(format!("Malformed request body: {e}")))?;
    let input = payload.into_input()?;
    let prediction = predict(&input)?;
    debug!(start = %input.start_date, next = %prediction.next_period_start, "cycle predicted");

    Ok(ApiResponse::ok(
        PeriodTrackerResponse::try_from(prediction)?,
        "Cycle predicted successfully",
    ))
}
