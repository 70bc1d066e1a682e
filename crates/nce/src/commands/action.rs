//! LWM2M action handler: submit, poll with progress lines, show the result.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use nce_api::{
    ActionOutcome, ActionReport, ActionRequest, NceClient, PayloadDecoder, PollState, ResultView,
    TlvDecoder, hex_dump,
};

use crate::cli::GlobalOpts;
use crate::commands::api_err;
use crate::error::CliError;
use crate::output::{self, Status};

/// Structured view of a finished action for `-o json|yaml`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionDocument<'a> {
    request_id: &'a str,
    action: String,
    resource: &'a str,
    outcome: &'static str,
    status: &'a str,
    attempts: u32,
    result: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    decoded: Option<String>,
}

pub async fn handle(
    request: &ActionRequest,
    client: &NceClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let status = Status::new(global);

    let report = client
        .perform(request, |_, response| {
            if response.state() == PollState::InProgress {
                status.info("Request in progress");
            }
        })
        .await
        .map_err(api_err)?;

    let response = report.outcome.response();
    let result = match &report.outcome {
        ActionOutcome::Succeeded { .. } => {
            status.success("Request succeeded");
            Ok(())
        }
        ActionOutcome::Failed { .. } => {
            status.failure(&format!("Request failed: {}", response.status()));
            Err(CliError::ActionFailed {
                request_id: report.request_id.clone(),
                status: response.status().to_owned(),
            })
        }
        ActionOutcome::TimedOut { attempts, .. } => {
            status.failure(&format!(
                "Request still in progress after {attempts} attempt(s), giving up"
            ));
            Err(CliError::PollTimeout {
                request_id: report.request_id.clone(),
                attempts: *attempts,
            })
        }
    };

    match render(request, &report, global) {
        Ok(rendered) => output::print_output(&rendered),
        Err(e) if result.is_err() => {
            warn!(error = %e, "could not render result, showing raw response");
            output::print_output(&output::render_json_pretty(response.raw())?);
        }
        Err(e) => return Err(e),
    }

    result
}

fn render(
    request: &ActionRequest,
    report: &ActionReport,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    let response = report.outcome.response();
    let view = ResultView::from_status(response)?;
    let text = render_text(&view)?;

    let doc = ActionDocument {
        request_id: &report.request_id,
        action: request.action().to_string(),
        resource: request.resource(),
        outcome: report.outcome.label(),
        status: response.status(),
        attempts: report.outcome.attempts(),
        result: response.result_data().unwrap_or(response.raw()),
        decoded: matches!(view, ResultView::Payload(_)).then(|| text.clone()),
    };

    Ok(output::render_structured(global.output, &doc)?.unwrap_or(text))
}

/// Text for a result view. Payloads that are not valid TLV fall back to
/// a hex dump.
fn render_text(view: &ResultView) -> Result<String, CliError> {
    match view {
        ResultView::Payload(bytes) => Ok(TlvDecoder.decode(bytes).unwrap_or_else(|e| {
            warn!(error = %e, "payload is not LWM2M TLV, showing hex dump");
            hex_dump(bytes)
        })),
        other => Ok(other.render(&TlvDecoder)?),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nce_api::decode_base64;
    use serde_json::json;

    #[test]
    fn tlv_payload_is_decoded() {
        let view = ResultView::Payload(decode_base64("xgBOb3JkaWM=").unwrap());
        assert_eq!(
            render_text(&view).unwrap(),
            r#"Resource 0: 4e6f72646963 ("Nordic")"#
        );
    }

    #[test]
    fn non_tlv_payload_falls_back_to_hex_dump() {
        let view = ResultView::Payload(vec![0x00]);
        assert_eq!(render_text(&view).unwrap(), hex_dump(&[0x00]));
    }

    #[test]
    fn json_result_is_pretty_printed() {
        let view = ResultView::Data(json!({ "value": 1 }));
        assert_eq!(render_text(&view).unwrap(), "{\n  \"value\": 1\n}");
    }
}
