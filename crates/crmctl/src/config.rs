//! CLI configuration: thin wrapper around `crmctl_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--profile, --base-url, --timeout).

use std::sync::Arc;
use std::time::Duration;

use crmctl_core::{Console, ConsoleConfig, FileSessionStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use crmctl_config::{
    Config, Profile, config_path, load_config_or_default, save_config, session_path,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref()).to_owned()
}

/// Build a `ConsoleConfig` from the config file, profile, and CLI overrides.
pub fn console_config(global: &GlobalOpts, cfg: &Config) -> Result<ConsoleConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut console_config = match (cfg.profiles.get(&profile_name), global.base_url.as_deref()) {
        (Some(profile), flag) => {
            let mut resolved = crmctl_config::profile_to_console_config(profile, &cfg.defaults)?;
            if let Some(url) = flag {
                resolved.base_url = crmctl_config::parse_base_url(url)?;
            }
            resolved
        }
        (None, Some(url)) => {
            let mut resolved = ConsoleConfig::new(crmctl_config::parse_base_url(url)?);
            resolved.timeout = Duration::from_secs(cfg.defaults.timeout);
            resolved.page_size = cfg.defaults.page_size;
            resolved
        }
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(secs) = global.timeout {
        console_config.timeout = Duration::from_secs(secs);
    }
    Ok(console_config)
}

/// Open the console for the active profile, restoring its saved session.
pub fn open_console(global: &GlobalOpts) -> Result<Console, CliError> {
    let cfg = load_config_or_default();
    let console_config = console_config(global, &cfg)?;
    let store = FileSessionStore::new(session_path(&active_profile_name(global, &cfg)));
    tracing::debug!(base_url = %console_config.base_url, session = %store.path().display(), "opening console");
    Ok(Console::init(console_config, Arc::new(store))?)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["crmctl"];
        argv.extend_from_slice(args);
        argv.push("whoami");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn with_profile() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                base_url: "https://crm.example.com/api".into(),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn flags_override_the_profile() {
        let cfg = with_profile();
        let resolved = console_config(
            &global(&["--base-url", "http://localhost:5000/api", "--timeout", "9"]),
            &cfg,
        )
        .unwrap();
        assert_eq!(resolved.base_url.as_str(), "http://localhost:5000/api");
        assert_eq!(resolved.timeout, Duration::from_secs(9));
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let resolved = console_config(&global(&[]), &with_profile()).unwrap();
        assert_eq!(resolved.base_url.as_str(), "https://crm.example.com/api");
        assert_eq!(resolved.timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_profile_and_url_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(console_config(&global(&[]), &cfg), Err(CliError::NoConfig { .. })));
        assert!(matches!(
            console_config(&global(&["--profile", "prod"]), &cfg),
            Err(CliError::ProfileNotFound { .. })
        ));
    }
}
