use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::controllers::stats;
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::response::{Counter, ServerInfo};

#[instrument(skip(state))]
pub(crate) async fn number_of_counters(
    State(state): State<AppState>,
) -> Result<Json<Counter>, Error> {
    let counter = stats::number_of_counters(&state.counter_controller).await?;

    Ok(Json(counter))
}

#[instrument(skip(state))]
pub(crate) async fn server_info(State(state): State<AppState>) -> Json<ServerInfo> {
    Json(stats::server_info(&state.counter_controller))
}
