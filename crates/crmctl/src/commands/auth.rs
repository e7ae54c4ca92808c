//! Sign-in, sign-out and identity.

use std::io::IsTerminal;

use dialoguer::Input;
use secrecy::SecretString;

use crmctl_config::ConfigError;
use crmctl_core::{Console, SessionUser};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

fn detail(user: &SessionUser) -> String {
    [
        format!("ID:       {}", user.id),
        format!("Username: {}", user.username.as_deref().unwrap_or("-")),
        format!("Email:    {}", user.email.as_deref().unwrap_or("-")),
        format!("Role:     {}", user.role_name.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

fn print_user(user: &SessionUser, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(global.output, user, detail, |u| u.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn login(console: &Console, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    let profile = cfg.profiles.get(&profile_name).cloned().unwrap_or_default();

    let email = match args.email.or_else(|| profile.email.clone()) {
        Some(email) => email,
        None if std::io::stdin().is_terminal() => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_err)?,
        None => {
            return Err(CliError::Validation {
                field: "email".into(),
                reason: "pass an email or set one on the profile".into(),
            });
        }
    };

    let user = if args.admin {
        console.admin_login(&email, args.client_page).await?
    } else {
        let password = password(&profile, &profile_name)?;
        console.login(&email, &password).await?
    };

    output::success(global, &format!("Signed in as {}", user.display_name()));
    print_user(&user, global)
}

/// Password from the credential chain, else an interactive prompt.
fn password(profile: &Profile, profile_name: &str) -> Result<SecretString, CliError> {
    match crmctl_config::resolve_password(profile, profile_name) {
        Ok(secret) => Ok(secret),
        Err(ConfigError::NoCredentials { .. }) if std::io::stdin().is_terminal() => {
            let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if pass.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            Ok(SecretString::from(pass))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn logout(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    let was_signed_in = console.is_authenticated();
    console.logout()?;
    if was_signed_in {
        output::success(global, "Signed out");
    } else {
        output::note(global, "No saved session");
    }
    Ok(())
}

pub fn whoami(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    let session = console.current_session().ok_or(CliError::NotSignedIn)?;
    print_user(&session.user, global)
}
