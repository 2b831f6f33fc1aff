//! `tangle init-token` implementation.

use crate::http::extractors::auth::create_token;
use crate::state::AppState;

/// Mint a token for `email` and print it. The plaintext is shown exactly
/// once; only its hash is stored.
pub async fn init_token(state: &AppState, email: &str) -> anyhow::Result<()> {
    let token = create_token(state, email).await?;

    println!();
    println!("  API token for {email} (save this -- it won't be shown again):");
    println!();
    println!("  {token}");
    println!();
    Ok(())
}
