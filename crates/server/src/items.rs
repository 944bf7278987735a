use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use api_types::{
    PageQuery,
    item::{ItemNew, ItemSearchQuery, ItemUpdate, ItemView},
};
use engine::{ItemSearch, MoneyCents, NewItemCmd, Page, UpdateItemCmd, User};

use crate::{
    ServerError,
    server::ServerState,
    views::{item_view, page},
};

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(owner_id): Path<Uuid>,
    Json(payload): Json<ItemNew>,
) -> Result<Json<ItemView>, ServerError> {
    let mut cmd = NewItemCmd::new(owner_id, user.id, payload.name);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(price) = payload.price_minor {
        cmd = cmd.price(MoneyCents::new(price));
    }
    let item = state.engine.create_item(cmd).await?;
    Ok(Json(item_view(item)))
}

pub async fn list_for_owner(
    State(state): State<ServerState>,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let items = state.engine.items_by_owner(owner_id).await?;
    Ok(Json(items.into_iter().map(item_view).collect()))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let items = state.engine.items(page(query)).await?;
    Ok(Json(items.into_iter().map(item_view).collect()))
}

pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<ItemSearchQuery>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let search = ItemSearch {
        text: query.q,
        min_price: query.min_price.map(MoneyCents::new),
        max_price: query.max_price.map(MoneyCents::new),
        owner_id: query.owner_id,
        available: query.available,
    };
    let page = Page::new(
        query.offset.unwrap_or(0),
        query.limit.unwrap_or(Page::DEFAULT_LIMIT),
    );
    let items = state.engine.search_items(&search, page).await?;
    Ok(Json(items.into_iter().map(item_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state.engine.item(item_id).await?;
    Ok(Json(item_view(item)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ItemUpdate>,
) -> Result<Json<ItemView>, ServerError> {
    let mut cmd = UpdateItemCmd::new(item_id, user.id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(price) = payload.price_minor {
        cmd = cmd.price(price.map(MoneyCents::new));
    }
    let item = state.engine.update_item(cmd).await?;
    Ok(Json(item_view(item)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state.engine.delete_item(item_id, user.id).await?;
    Ok(Json(item_view(item)))
}
