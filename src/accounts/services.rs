use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    accounts::{
        dto::{CreateAccountRequest, LoginRequest, LoginResponse, UpdateAccountRequest},
        repo::{AccountStore, StoreError},
        repo_types::{Account, NewAccount},
    },
    auth::jwt::JwtKeys,
    error::ApiError,
};

/// How many account numbers to draw before giving up on collisions.
pub const MAX_NUMBER_ATTEMPTS: usize = 5;

pub(crate) fn is_valid_name(name: &str) -> bool {
    lazy_static! {
        static ref NAME_RE: Regex = Regex::new(r"^\p{L}[\p{L} '\-]{0,49}$").unwrap();
    }
    NAME_RE.is_match(name)
}

fn validated_names<'a>(first: &'a str, last: &'a str) -> Result<(&'a str, &'a str), ApiError> {
    let (first, last) = (first.trim(), last.trim());
    if !is_valid_name(first) {
        return Err(ApiError::BadRequest("invalid firstName".into()));
    }
    if !is_valid_name(last) {
        return Err(ApiError::BadRequest("invalid lastName".into()));
    }
    Ok((first, last))
}

/// Hashes the password, persists the account and issues its first token.
pub async fn create_account(
    store: &dyn AccountStore,
    keys: &JwtKeys,
    req: CreateAccountRequest,
) -> Result<(Account, String), ApiError> {
    let (first_name, last_name) = validated_names(&req.first_name, &req.last_name)?;

    let mut new = NewAccount::new(first_name, last_name, &req.password)?;

    for attempt in 1..=MAX_NUMBER_ATTEMPTS {
        match store.create(&new).await {
            Ok(account) => {
                let token = keys.issue(&account)?;
                info!(account_id = account.id, number = account.number, "account created");
                return Ok((account, token));
            }
            Err(StoreError::Conflict) => {
                warn!(attempt, number = new.number, "account number collision");
                new.renumber();
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(StoreError::Conflict.into())
}

pub async fn update_profile(
    store: &dyn AccountStore,
    id: i32,
    req: UpdateAccountRequest,
) -> Result<Account, ApiError> {
    let (first_name, last_name) = validated_names(&req.first_name, &req.last_name)?;
    let mut account = store.get_by_id(id).await.map_err(|e| match e {
        StoreError::NotFound => ApiError::AccountNotFound(id),
        other => other.into(),
    })?;
    account.first_name = first_name.to_string();
    account.last_name = last_name.to_string();
    store.update(&account).await?;
    info!(account_id = id, "account profile updated");
    Ok(account)
}

/// Unknown numbers and wrong passwords produce the same error.
pub async fn login(
    store: &dyn AccountStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let account = match store.get_by_number(req.number).await {
        Ok(account) => account,
        Err(StoreError::NotFound) => {
            warn!(number = req.number, "login unknown account number");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    if !account.password_matches(&req.password)? {
        warn!(number = account.number, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = keys.issue(&account)?;
    info!(account_id = account.id, number = account.number, "account logged in");
    Ok(LoginResponse {
        number: account.number,
        token,
    })
}
