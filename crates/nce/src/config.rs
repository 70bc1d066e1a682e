//! CLI configuration: thin wrapper around `nce_config`.
//!
//! Loads the layered config and applies `GlobalOpts` flag overrides
//! (--device, --timeout, --poll-attempts, ...) on top.

use std::path::PathBuf;
use std::sync::Arc;

use nce_api::NceClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use nce_config::{Config, config_path, load_config, save_config};

/// Config file in effect: `--config` / `NCE_CONFIG`, else the platform path.
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config and apply flag overrides. Flags beat the file and
/// `NCE__*` variables.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config(global.config.as_deref())?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref device) = global.device {
        cfg.device_id.clone_from(device);
    }
    if let Some(ref path) = global.basic_token_file {
        cfg.files.basic_token.clone_from(path);
    }
    if let Some(ref path) = global.access_token_file {
        cfg.files.access_token.clone_from(path);
    }
    if let Some(timeout) = global.timeout {
        cfg.api.timeout = timeout;
    }
    if let Some(attempts) = global.poll_attempts {
        cfg.poll.attempts = attempts;
    }
    if let Some(interval) = global.poll_interval_ms {
        cfg.poll.interval_ms = interval;
    }
}

/// Build a client bound to the configured device, reading and writing
/// the access token file.
pub fn build_client(cfg: &Config) -> Result<NceClient, CliError> {
    let client = NceClient::new(
        cfg.endpoints()?,
        cfg.device()?,
        Arc::new(cfg.access_token_store()),
        &cfg.transport(),
    )?
    .with_poll_policy(cfg.poll_policy()?);
    Ok(client)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["nce"];
        argv.extend_from_slice(args);
        argv.push("auth");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_config() {
        let mut cfg = Config::default();
        apply_overrides(
            &mut cfg,
            &global(&[
                "--device",
                "123",
                "--access-token-file",
                "/tmp/tok",
                "--poll-attempts",
                "3",
                "--poll-interval-ms",
                "0",
                "--timeout",
                "5",
            ]),
        );
        assert_eq!(cfg.device_id, "123");
        assert_eq!(cfg.files.access_token, PathBuf::from("/tmp/tok"));
        assert_eq!(cfg.poll.attempts, 3);
        assert_eq!(cfg.poll.interval_ms, 0);
        assert_eq!(cfg.api.timeout, 5);
    }

    #[test]
    fn no_flags_keep_config() {
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, &global(&[]));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn invalid_device_is_usage_error() {
        let cfg = Config {
            device_id: "not-a-number".into(),
            ..Config::default()
        };
        let err = build_client(&cfg).err().unwrap();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}
