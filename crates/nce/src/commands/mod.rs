//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod action;
pub mod auth;
pub mod config_cmd;
pub mod provision;
pub mod token;

use nce_api::{ActionKind, ActionRequest, NceClient};

use crate::cli::{ActionArg, Command, GlobalOpts, ObserveCommand};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

/// Route a command that talks to the API.
pub async fn dispatch(
    cmd: Command,
    client: &NceClient,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Auth => auth::handle(client, cfg, global).await,
        Command::Provision(args) => provision::handle(args, client, cfg, global).await,
        Command::Read(args) => {
            let request = ActionRequest::new(ActionKind::Read, args.resource);
            action::handle(&request, client, global).await
        }
        Command::Write(args) => {
            let request = ActionRequest::new(ActionKind::Write, args.resource)
                .with_data(args.value.as_deref());
            action::handle(&request, client, global).await
        }
        Command::Exec(args) => {
            let request = ActionRequest::new(ActionKind::Execute, args.resource);
            action::handle(&request, client, global).await
        }
        Command::Observe(args) => {
            let request = match args.command {
                ObserveCommand::Start(r) => ActionRequest::new(ActionKind::ObserveStart, r.resource),
                ObserveCommand::Stop(r) => ActionRequest::new(ActionKind::ObserveStop, r.resource),
            };
            action::handle(&request, client, global).await
        }
        Command::Do(args) => {
            let request = ActionRequest::new(action_kind(args.action), args.resource)
                .with_data(args.value.as_deref());
            action::handle(&request, client, global).await
        }
        // Token, Config and Completions are handled before dispatch
        Command::Token(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

pub fn action_kind(arg: ActionArg) -> ActionKind {
    match arg {
        ActionArg::Read => ActionKind::Read,
        ActionArg::Write => ActionKind::Write,
        ActionArg::Execute => ActionKind::Execute,
        ActionArg::ObserveStart => ActionKind::ObserveStart,
        ActionArg::ObserveStop => ActionKind::ObserveStop,
    }
}

/// Convert an API error, first printing the raw response it carries.
pub fn api_err(err: nce_api::Error) -> CliError {
    if let Some(body) = err.raw_response() {
        match output::render_json_pretty(body) {
            Ok(text) => output::print_output(&text),
            Err(_) => output::print_output(&body.to_string()),
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_args_map_to_wire_names() {
        assert_eq!(action_kind(ActionArg::ObserveStart).to_string(), "observe-start");
        assert_eq!(action_kind(ActionArg::Execute).to_string(), "execute");
        assert_eq!(action_kind(ActionArg::Write), ActionKind::Write);
    }
}
