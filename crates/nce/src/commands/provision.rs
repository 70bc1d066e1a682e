use serde_json::json;

use nce_api::NceClient;

use crate::cli::{GlobalOpts, ProvisionArgs};
use crate::commands::api_err;
use crate::config::Config;
use crate::error::CliError;
use crate::output::{self, Status};

pub async fn handle(
    args: ProvisionArgs,
    client: &NceClient,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let secret = args.secret.as_deref().unwrap_or(&cfg.default_psk);
    let device_id = client.provision(secret).await.map_err(api_err)?;

    Status::new(global).success(&format!("Device {device_id} provisioned"));

    let doc = json!({ "deviceId": device_id });
    if let Some(rendered) = output::render_structured(global.output, &doc)? {
        output::print_output(&rendered);
    }
    Ok(())
}
