use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    accounts::{
        repo::{AccountStore, StoreError},
        repo_types::Account,
    },
    auth::{
        claims::Claims,
        jwt::{JwtKeys, TokenError},
    },
    state::AppState,
};

/// Header carrying the bearer token on guarded routes.
pub const TOKEN_HEADER: &str = "x-jwt-token";

/// The true cause of a denial. Logged server-side; clients only ever get
/// [`permission_denied`].
#[derive(Debug, Error)]
pub enum DenyReason {
    #[error("no token presented")]
    MissingToken,
    #[error("token rejected: {0}")]
    InvalidToken(TokenError),
    #[error("unparsable account id {0:?}")]
    MalformedId(String),
    #[error("account {0} not found")]
    AccountNotFound(i32),
    #[error("account store unavailable: {0}")]
    StoreUnavailable(StoreError),
    #[error("token for account number {claimed} used on account {account_id}")]
    NotOwner { account_id: i32, claimed: i64 },
}

impl DenyReason {
    /// Last state the request reached before being denied.
    pub fn stage(&self) -> &'static str {
        match self {
            DenyReason::MissingToken => "start",
            DenyReason::InvalidToken(_) => "token_extracted",
            DenyReason::MalformedId(_) => "token_validated",
            DenyReason::AccountNotFound(_) | DenyReason::StoreUnavailable(_) => "id_parsed",
            DenyReason::NotOwner { .. } => "resource_loaded",
        }
    }
}

/// Everything the guard established about one request. Lives only for the
/// duration of that request.
#[derive(Debug)]
pub struct AuthenticatedRequest {
    pub account_id: i32,
    pub claims: Claims,
    pub account: Account,
}

/// Runs the ownership checks in order: token present, token valid, id
/// parsable, account loadable, account number matches the token's claim.
/// Each step needs the previous one's output, and nothing touches the store
/// before the token has been validated. `raw_id` is `None` when the path
/// segment could not be decoded at all.
pub async fn authorize(
    store: &dyn AccountStore,
    keys: &JwtKeys,
    token: Option<&str>,
    raw_id: Option<&str>,
) -> Result<AuthenticatedRequest, DenyReason> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(DenyReason::MissingToken)?;

    let claims = keys.validate(token).map_err(DenyReason::InvalidToken)?;

    let account_id = raw_id
        .and_then(parse_account_id)
        .ok_or_else(|| DenyReason::MalformedId(raw_id.unwrap_or_default().to_string()))?;

    let account = store.get_by_id(account_id).await.map_err(|e| match e {
        StoreError::NotFound => DenyReason::AccountNotFound(account_id),
        other => DenyReason::StoreUnavailable(other),
    })?;

    if account.number != claims.account_number {
        return Err(DenyReason::NotOwner {
            account_id,
            claimed: claims.account_number,
        });
    }

    Ok(AuthenticatedRequest {
        account_id,
        claims,
        account,
    })
}

/// Non-negative integer that fits the store's id column.
fn parse_account_id(raw: &str) -> Option<i32> {
    raw.parse::<u32>().ok().and_then(|v| i32::try_from(v).ok())
}

/// Middleware for routes keyed by `:id`. The wrapped handler runs only when
/// [`authorize`] succeeds and its response is passed through untouched.
/// A path that fails to decode is denied like any other bad id, after the
/// token checks.
pub async fn require_account_owner(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let raw_id = match path {
        Ok(Path(raw_id)) => Some(raw_id),
        Err(rejection) => {
            debug!(rejection = %rejection.body_text(), "undecodable account id");
            None
        }
    };

    let outcome = authorize(
        state.store.as_ref(),
        &state.keys,
        token.as_deref(),
        raw_id.as_deref(),
    )
    .await;
    match outcome {
        Ok(authorized) => {
            debug!(
                account_id = authorized.account_id,
                account_number = authorized.account.number,
                token_exp = authorized.claims.exp,
                "access granted"
            );
            next.run(request).await
        }
        Err(reason) => {
            match &reason {
                DenyReason::StoreUnavailable(_) => {
                    error!(stage = reason.stage(), reason = %reason, "access denied")
                }
                _ => warn!(stage = reason.stage(), reason = %reason, "access denied"),
            }
            permission_denied()
        }
    }
}

/// The single response every denial produces.
pub fn permission_denied() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "permission denied" })),
    )
        .into_response()
}
