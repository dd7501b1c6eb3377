//! Session and profile command handlers

use super::CliContext;
use crate::cli::commands::{ProfileAction, ProfileFields};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output::{print_auth, print_info, print_success, render, table_output};
use taskhire_sdk::{QueryKey, RefreshOutcome, UpdateProfileDto};
use tracing::debug;

/// Handle login command
pub async fn handle_login(config: &CliConfig) -> Result<()> {
    if !config.has_launch_data() {
        return Err(CliError::Login(
            "no launch data configured; set auth.launch_url or auth.init_data".into(),
        ));
    }

    let ctx = CliContext::connect(config, "/login")?;
    match ctx.client.refresh().await {
        RefreshOutcome::Refreshed => {
            print_success("Logged in");
            Ok(())
        }
        RefreshOutcome::AlreadyValid => {
            print_info("Already logged in");
            Ok(())
        }
        outcome => {
            debug!(?outcome, "Login did not produce a token");
            Err(CliError::Login(
                "the server did not accept the launch data (run with -v for details)".into(),
            ))
        }
    }
}

/// Handle logout command
pub async fn handle_logout(config: &CliConfig) -> Result<()> {
    let ctx = CliContext::connect(config, "/")?;
    ctx.client.logout().await;
    print_success("Logged out");
    Ok(())
}

/// Handle whoami command
pub async fn handle_whoami(config: &CliConfig, silent: bool, json: bool) -> Result<()> {
    let ctx = CliContext::connect(config, "/profile")?;

    let user = match ctx.client.get_profile_with_retry(silent).await {
        Ok(user) => user,
        Err(e) => {
            if e.is_unauthorized() && (silent || ctx.redirected_to_login()) {
                print_auth("Session expired. Run 'taskhire login' to sign in again.");
            }
            return Err(e.into());
        }
    };

    ctx.remember(QueryKey::new("profile"), &user);
    render(json, &user, table_output::display_user)
}

/// Handle user command
pub async fn handle_user(config: &CliConfig, user_id: &str, json: bool) -> Result<()> {
    let ctx = CliContext::connect(config, &format!("/profile/{user_id}"))?;
    let user = ctx.client.get_user_profile(user_id).await?;
    render(json, &user, table_output::display_user)
}

/// Handle profile commands
pub async fn handle_profile(config: &CliConfig, action: ProfileAction, json: bool) -> Result<()> {
    match action {
        ProfileAction::Update(fields) => update_profile(config, fields, json).await,
    }
}

async fn update_profile(config: &CliConfig, fields: ProfileFields, json: bool) -> Result<()> {
    let dto = UpdateProfileDto {
        username: fields.username,
        first_name: fields.first_name,
        last_name: fields.last_name,
        language: fields.language,
        avatar: fields.avatar,
    };
    if dto == UpdateProfileDto::default() {
        print_info("Nothing to update");
        return Ok(());
    }

    let ctx = CliContext::connect(config, "/profile")?;
    let user = ctx.client.update_profile(&dto).await?;

    if json {
        return crate::output::json_output(&user);
    }
    print_success("Profile updated");
    table_output::display_user(&user);
    Ok(())
}
