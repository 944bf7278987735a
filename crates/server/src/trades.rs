//! Trade endpoints. Every route acts as the authenticated user.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use api_types::{
    PageQuery,
    trade::{TradeAction, TradeNew, TradeRespond, TradeView},
};
use engine::{ProposeTradeCmd, RespondTradeCmd, User};

use crate::{
    ServerError,
    server::ServerState,
    views::{page, trade_view},
};

pub async fn propose(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TradeNew>,
) -> Result<Json<TradeView>, ServerError> {
    let trade = state
        .engine
        .propose_trade(ProposeTradeCmd::new(
            user.id,
            payload.proposer_item_id,
            payload.responder_item_id,
        ))
        .await?;
    Ok(Json(trade_view(trade)))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<TradeView>>, ServerError> {
    let trades = state.engine.trades_for_user(user.id, page(query)).await?;
    Ok(Json(trades.into_iter().map(trade_view).collect()))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trade_id): Path<Uuid>,
) -> Result<Json<TradeView>, ServerError> {
    let trade = state.engine.trade(user.id, trade_id).await?;
    Ok(Json(trade_view(trade)))
}

pub async fn respond(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trade_id): Path<Uuid>,
    Json(payload): Json<TradeRespond>,
) -> Result<Json<TradeView>, ServerError> {
    let action = match payload.action {
        TradeAction::Accept => engine::TradeAction::Accept,
        TradeAction::Reject => engine::TradeAction::Reject,
    };
    let trade = state
        .engine
        .respond_trade(RespondTradeCmd::new(user.id, trade_id, action))
        .await?;
    Ok(Json(trade_view(trade)))
}

pub async fn cancel(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(trade_id): Path<Uuid>,
) -> Result<Json<TradeView>, ServerError> {
    let trade = state.engine.cancel_trade(user.id, trade_id).await?;
    Ok(Json(trade_view(trade)))
}
