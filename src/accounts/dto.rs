use serde::{Deserialize, Serialize};

use crate::accounts::repo_types::Account;

/// Request body for account creation.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub password: String,
}

/// The created account plus a token issued for it.
#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    #[serde(flatten)]
    pub account: Account,
    pub token: String,
}

/// Profile fields an owner may change. Number, balance and id stay put.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub number: i64,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub number: i64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    #[serde(rename = "receiver_id")]
    pub to_account: i32,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: i32,
}
