//! Access token commands.

use anyhow::{Context, Result};
use console::style;

use roost_types::error::RepositoryError;
use roost_types::user::UserId;

use crate::state::AppState;

fn parse_user_id(raw: &str) -> Result<UserId> {
    raw.parse()
        .with_context(|| format!("'{raw}' is not a valid user id"))
}

/// Issue a token for a user and print it once.
pub async fn issue_token(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let user_id = parse_user_id(user_id)?;

    let token = match state.tokens.issue(&user_id).await {
        Ok(token) => token,
        Err(RepositoryError::NotFound) => anyhow::bail!("user {user_id} not found"),
        Err(e) => return Err(e.into()),
    };

    if json {
        let out = serde_json::json!({ "user_id": user_id, "token": token });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Token issued (save this, it won't be shown again):",
        style("🔑").bold()
    );
    println!();
    println!("  {}", style(&token).yellow().bold());
    println!();

    Ok(())
}

/// Revoke all of a user's tokens.
pub async fn revoke_tokens(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let user_id = parse_user_id(user_id)?;
    let removed = state.tokens.revoke_all(&user_id).await?;

    if json {
        let out = serde_json::json!({ "user_id": user_id, "revoked": removed });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Revoked {} token{}",
        style("✓").green().bold(),
        style(removed).bold(),
        if removed == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
