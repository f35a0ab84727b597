use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    accounts::{
        dto::{
            CreateAccountRequest, CreateAccountResponse, DeletedResponse, LoginRequest,
            LoginResponse, TransferRequest, UpdateAccountRequest,
        },
        repo::StoreError,
        repo_types::Account,
        services,
    },
    auth::{guard::require_account_owner, jwt::JwtKeys},
    error::ApiError,
    state::AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/account", get(list_accounts).post(create_account))
        .route("/login", post(login))
        .route("/transfer", post(transfer))
}

/// Routes keyed by an account id; only the account's owner gets through.
pub fn owner_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/account/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route_layer(middleware::from_fn_with_state(state, require_account_owner))
}

#[instrument(skip(state))]
pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    let accounts = state.store.get_all().await?;
    Ok(Json(accounts))
}

#[instrument(skip(state, payload))]
pub async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Json<CreateAccountResponse>, ApiError> {
    let Json(req) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let (account, token) = services::create_account(state.store.as_ref(), &keys, req).await?;
    Ok(Json(CreateAccountResponse { account, token }))
}

#[instrument(skip(state))]
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Account>, ApiError> {
    let account = state.store.get_by_id(id).await.map_err(|e| match e {
        StoreError::NotFound => ApiError::AccountNotFound(id),
        other => other.into(),
    })?;
    Ok(Json(account))
}

#[instrument(skip(state, payload))]
pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<Json<Account>, ApiError> {
    let Json(req) = payload?;
    let account = services::update_profile(state.store.as_ref(), id, req).await?;
    Ok(Json(account))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeletedResponse>, ApiError> {
    state.store.delete(id).await.map_err(|e| match e {
        StoreError::NotFound => ApiError::AccountNotFound(id),
        other => other.into(),
    })?;
    info!(account_id = id, "account deleted");
    Ok(Json(DeletedResponse { deleted: id }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let res = services::login(state.store.as_ref(), &keys, req).await?;
    Ok(Json(res))
}

/// Parses the request so clients get validation errors, then refuses: no
/// ledger semantics exist yet.
#[instrument(skip(payload))]
pub async fn transfer(
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<(), ApiError> {
    let Json(req) = payload?;
    info!(to_account = req.to_account, amount = req.amount, "transfer requested");
    Err(ApiError::NotImplemented)
}
