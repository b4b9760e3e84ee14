use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use eo_shared::config::{AppConfig, StoreKind};

use crate::actions::Action;

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Globals {
    pub config_file: Option<PathBuf>,
    pub store: Option<StoreKind>,
    pub verbosity: u8,
}

impl Globals {
    /// Apply command line overrides on top of loaded configuration
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(store) = self.store {
            config.otp.store = store;
        }
        config
    }
}

pub fn globals(matches: &clap::ArgMatches) -> Result<Globals> {
    let store = matches
        .get_one::<String>("store")
        .map(|s| s.parse::<StoreKind>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(Globals {
        config_file: matches.get_one::<String>("config").map(PathBuf::from),
        store,
        verbosity: matches.get_count("verbosity"),
    })
}

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    // Closure to return required string arguments
    let arg = |m: &clap::ArgMatches, name: &str| -> Result<String> {
        m.get_one::<String>(name)
            .cloned()
            .with_context(|| format!("missing required argument: {name}"))
    };

    match matches.subcommand() {
        Some(("request", sub_m)) => Ok(Action::Request {
            email: arg(sub_m, "email")?,
            log_only: sub_m.get_flag("log-only"),
        }),
        Some(("verify", sub_m)) => Ok(Action::Verify {
            email: arg(sub_m, "email")?,
            code: arg(sub_m, "code")?,
        }),
        Some(("purge", sub_m)) => Ok(Action::Purge {
            watch: sub_m.get_flag("watch"),
            interval: sub_m.get_one::<u64>("interval").copied().map(Duration::from_secs),
        }),
        Some(("init-db", _)) => Ok(Action::InitDb),
        _ => anyhow::bail!("no subcommand given"),
    }
}
