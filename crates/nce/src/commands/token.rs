use serde_json::json;

use nce_api::TokenStore;

use crate::cli::{GlobalOpts, TokenArgs, TokenCommand};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: TokenArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        TokenCommand::Status => {
            let store = cfg.access_token_store();
            let location = store.location();
            let present = store.is_present();

            let doc = json!({ "present": present, "location": location });
            if let Some(rendered) = output::render_structured(global.output, &doc)? {
                output::print_output(&rendered);
            } else if present {
                output::print_output(&format!("Access token present ({location})"));
            }

            if present {
                Ok(())
            } else {
                Err(CliError::NoAccessToken { location })
            }
        }
    }
}
