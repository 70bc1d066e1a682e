//! Config subcommand handlers.

use std::fmt::Write as _;

use serde_json::json;

use nce_api::TokenStore;
use nce_config::{ConfigError, CredentialSource};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output::{self, Status};

// ── Helpers ─────────────────────────────────────────────────────────

/// Where the basic credential would come from, without revealing it.
fn credential_source(cfg: &Config) -> Result<Option<CredentialSource>, CliError> {
    match nce_config::resolve_basic_credential(cfg) {
        Ok((_, source)) => Ok(Some(source)),
        Err(ConfigError::NoCredential { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn format_config(cfg: &Config, source: Option<&CredentialSource>) -> Result<String, CliError> {
    let mut out =
        toml::to_string_pretty(cfg).map_err(|e| CliError::Serialization(e.to_string()))?;
    let _ = writeln!(out);
    match source {
        Some(source) => {
            let _ = writeln!(out, "# basic credential: {source}");
        }
        None => {
            let _ = writeln!(out, "# basic credential: not found");
        }
    }
    let present = if cfg.access_token_store().is_present() {
        "present"
    } else {
        "absent"
    };
    let _ = write!(out, "# access token: {present}");
    Ok(out)
}

/// Map an interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let status = Status::new(global);

    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let source = credential_source(&cfg)?;

            let doc = json!({
                "configFile": config::active_config_path(global),
                "config": cfg,
                "basicCredential": source.as_ref().map(ToString::to_string),
                "accessToken": cfg.access_token_store().is_present(),
            });
            let rendered = match output::render_structured(global.output, &doc)? {
                Some(rendered) => rendered,
                None => format_config(&cfg, source.as_ref())?,
            };
            output::print_output(&rendered);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::active_config_path(global).display().to_string());
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::active_config_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config(&Config::default(), &path)?;
            status.success(&format!("Wrote {}", path.display()));
            Ok(())
        }

        ConfigCommand::SetCredential => {
            let secret = rpassword::prompt_password("Basic credential (base64 client_id:secret): ")
                .map_err(prompt_err)?;
            let secret = secret.trim();
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "credential".into(),
                    reason: "credential cannot be empty".into(),
                });
            }
            nce_config::store_basic_credential(secret)?;
            status.success("Credential stored in system keyring");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nce_config::FileSettings;

    #[test]
    fn shown_config_has_no_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            use_keyring: false,
            files: FileSettings {
                basic_token: dir.path().join("basic_token.txt"),
                access_token: dir.path().join("access_token.txt"),
            },
            ..Config::default()
        };
        std::fs::write(&cfg.files.basic_token, "c2VjcmV0").unwrap();

        let source = credential_source(&cfg).unwrap();
        let text = format_config(&cfg, source.as_ref()).unwrap();

        assert!(text.contains("device_id = \"8988228066612797879\""));
        assert!(text.contains("basic_token.txt"));
        assert!(text.contains("# access token: absent"));
        assert!(!text.contains("c2VjcmV0"));
    }
}
