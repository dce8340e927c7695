use axum::Json;
use axum::extract::{Query, State};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request;
use crate::types::response::{Counter, Token};

#[instrument(skip(state))]
pub(crate) async fn new_counter(
    State(state): State<AppState>,
    Query(params): Query<request::NewCounter>,
) -> Result<Json<Token>, Error> {
    let token = state
        .counter_controller
        .create(&params.name, params.initialvalue)
        .await?;

    Ok(Json(Token::new(token)))
}

#[instrument(skip(state))]
pub(crate) async fn add_counter(
    State(state): State<AppState>,
    Query(params): Query<request::AddCounter>,
) -> Result<Json<Counter>, Error> {
    let counter = state
        .counter_controller
        .add_counter(&params.token, &params.name, params.initialvalue)
        .await?;

    Ok(Json(counter))
}

#[instrument(skip(state))]
pub(crate) async fn delete_counter(
    State(state): State<AppState>,
    Query(params): Query<request::Lookup>,
) -> Result<Json<Counter>, Error> {
    let counter = state
        .counter_controller
        .delete_counter(&params.token, params.name.as_deref())
        .await?;

    Ok(Json(counter))
}

#[instrument(skip(state))]
pub(crate) async fn current_reading(
    State(state): State<AppState>,
    Query(params): Query<request::Lookup>,
) -> Result<Json<Vec<Counter>>, Error> {
    let counters = state
        .counter_controller
        .read(&params.token, params.name.as_deref())
        .await?;

    Ok(Json(counters))
}

#[instrument(skip(state))]
pub(crate) async fn read_only_token(
    State(state): State<AppState>,
    Query(params): Query<request::TokenOnly>,
) -> Result<Json<Token>, Error> {
    let token = state
        .counter_controller
        .mint_read_only(&params.token)
        .await?;

    Ok(Json(Token::new(token)))
}

#[instrument(skip(state))]
pub(crate) async fn next(
    State(state): State<AppState>,
    Query(params): Query<request::Increment>,
) -> Result<Json<Counter>, Error> {
    let counter = state
        .counter_controller
        .increment(&params.token, params.name.as_deref(), params.increment)
        .await?;

    Ok(Json(counter))
}

#[instrument(skip(state))]
pub(crate) async fn previous(
    State(state): State<AppState>,
    Query(params): Query<request::Decrement>,
) -> Result<Json<Counter>, Error> {
    let counter = state
        .counter_controller
        .decrement(&params.token, params.name.as_deref(), params.decrement)
        .await?;

    Ok(Json(counter))
}

#[instrument(skip(state))]
pub(crate) async fn reset(
    State(state): State<AppState>,
    Query(params): Query<request::Reset>,
) -> Result<Json<Counter>, Error> {
    let counter = state
        .counter_controller
        .reset(&params.token, params.name.as_deref(), params.initialvalue)
        .await?;

    Ok(Json(counter))
}
