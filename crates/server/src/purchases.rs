use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use api_types::item::ItemView;
use engine::{BuyCmd, User};

use crate::{ServerError, server::ServerState, views::item_view};

/// `POST /buy/{buyer_id}/{item_id}`: the token's user must be the buyer.
pub async fn buy(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((buyer_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state
        .engine
        .buy(BuyCmd::new(buyer_id, item_id).acting_user(user.id))
        .await?;
    Ok(Json(item_view(item)))
}
