use anyhow::Context;
use tracing::info;

use crate::{
    accounts::{services::create_account, CreateAccountRequest},
    state::AppState,
};

/// Creates the demo account used for local development.
pub async fn seed_accounts(state: &AppState) -> anyhow::Result<()> {
    let req = CreateAccountRequest {
        first_name: "Demo".into(),
        last_name: "Account".into(),
        password: state.config.seed_password.clone(),
    };
    let (account, _token) = create_account(state.store.as_ref(), &state.keys, req)
        .await
        .context("seed demo account")?;
    info!(account_id = account.id, number = account.number, "seeded account");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        accounts::repo::AccountStore,
        testing::{self, MemoryStore},
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn demo_account_uses_configured_password() {
        let store = Arc::new(MemoryStore::default());
        let state = testing::state(store.clone());

        seed_accounts(&state).await.expect("seed");

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_name, "Demo");
        assert!(all[0].password_matches("seed-pass").unwrap());
    }

    #[tokio::test]
    async fn store_failure_fails_the_seed() {
        let store = Arc::new(MemoryStore::default());
        store.set_failing(true);
        let state = testing::state(store.clone());
        assert!(seed_accounts(&state).await.is_err());
    }
}
