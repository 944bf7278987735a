use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{ServerError, TokenSigner, auth, items, purchases, trades, users};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: Arc<TokenSigner>,
}

/// Resolves the bearer token to a live account and stores it in the request
/// extensions as an [`engine::User`].
async fn require_user(
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(ServerError::Unauthorized(
            "missing bearer token".to_string(),
        ));
    };
    let claims = state.tokens.verify(bearer.token())?;

    // The account may have been deleted after the token was issued.
    let user = match state.engine.user(claims.user_id).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => {
            return Err(ServerError::Unauthorized("unknown user".to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Builds the HTTP application around an engine and a token signer.
pub fn app(engine: Engine, tokens: TokenSigner) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        tokens: Arc::new(tokens),
    })
}

fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/token", post(auth::login))
        .route("/users/", post(users::register).get(users::list))
        .route("/users/{user_id}/items/", get(items::list_for_owner))
        .route("/items/", get(items::list))
        .route("/items/search", get(items::search))
        .route("/items/{item_id}", get(items::get));

    let protected = Router::new()
        .route("/users/me", get(users::me))
        .route(
            "/users/{user_id}",
            axum::routing::put(users::update).delete(users::delete),
        )
        .route("/users/{user_id}/items/", post(items::create))
        .route(
            "/items/{item_id}",
            axum::routing::put(items::update).delete(items::delete),
        )
        .route("/trades/", post(trades::propose).get(trades::list))
        .route("/trades/{trade_id}", get(trades::get))
        .route("/trades/{trade_id}/respond", post(trades::respond))
        .route("/trades/{trade_id}/cancel", post(trades::cancel))
        .route("/buy/{buyer_id}/{item_id}", post(purchases::buy))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    tokens: TokenSigner,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, tokens)).await
}
