//! Directory seeding commands: add and list users.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use roost_types::error::RepositoryError;
use roost_types::user::NewUser;

use crate::state::AppState;

/// Add a user to the local directory.
pub async fn add_user(
    state: &AppState,
    phone: String,
    email: String,
    avatar: Option<String>,
    json: bool,
) -> Result<()> {
    if phone.trim().is_empty() || email.trim().is_empty() {
        anyhow::bail!("phone and email must not be empty");
    }

    let profile = match state.users.create(&NewUser { phone, email, avatar }).await {
        Ok(profile) => profile,
        Err(RepositoryError::Conflict(msg)) => anyhow::bail!(msg),
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!();
    println!("  {} User added", style("✓").green().bold());
    println!();
    println!("  {}  {}", style("Email:").bold(), style(&profile.email).cyan());
    println!("  {}  {}", style("Phone:").bold(), &profile.phone);
    println!(
        "  {}     {}",
        style("ID:").bold(),
        style(profile.id.to_string()).dim()
    );
    println!();
    println!(
        "  Issue a token: {}",
        style(format!("roost token issue {}", profile.id)).yellow()
    );
    println!();

    Ok(())
}

/// List all directory users in a table.
pub async fn list_users(state: &AppState, json: bool) -> Result<()> {
    let users = state.users.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!();
        println!(
            "  {} No users yet. Add one with: {}",
            style("i").blue().bold(),
            style("roost user add --phone <p> --email <e>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Phone").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for user in &users {
        table.add_row(vec![
            Cell::new(user.id.to_string()).fg(Color::DarkGrey),
            Cell::new(&user.email).fg(Color::Cyan),
            Cell::new(&user.phone),
            Cell::new(user.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} user{}",
        style(users.len()).bold(),
        if users.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
