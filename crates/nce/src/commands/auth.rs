use serde_json::json;
use tracing::debug;

use nce_api::NceClient;

use crate::cli::GlobalOpts;
use crate::commands::api_err;
use crate::config::Config;
use crate::error::CliError;
use crate::output::{self, Status};

pub async fn handle(client: &NceClient, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let (credential, source) = nce_config::resolve_basic_credential(cfg)?;
    debug!(source = %source, "using basic credential");

    client.authenticate(&credential).await.map_err(api_err)?;

    let location = client.tokens().location();
    Status::new(global).success("Access token saved");

    let doc = json!({ "authenticated": true, "tokenStore": location });
    if let Some(rendered) = output::render_structured(global.output, &doc)? {
        output::print_output(&rendered);
    }
    Ok(())
}
