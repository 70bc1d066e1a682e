// LWM2M action endpoints
//
// Submit an action against a resource address, then poll the request
// until it reaches a terminal status or the attempt budget runs out.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::client::{ApiResponse, NceClient};
use crate::error::Error;

// ── Request ─────────────────────────────────────────────────────────

/// The operation to perform on a resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ActionKind {
    Read,
    Write,
    Execute,
    ObserveStart,
    ObserveStop,
}

/// How the platform should deliver the request to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestMode {
    SendNow,
}

/// Body of `POST {device}/actions/LWM2M`.
///
/// Built fresh for every call. `data` is only serialized when a non-empty
/// value was given; an omitted field and an empty string mean different
/// things to the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    request_mode: RequestMode,
    send_attempts: u32,
    action: ActionKind,
    resource_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

impl ActionRequest {
    pub fn new(action: ActionKind, resource: impl Into<String>) -> Self {
        Self {
            request_mode: RequestMode::SendNow,
            send_attempts: 1,
            action,
            resource_address: resource.into(),
            data: None,
        }
    }

    /// Attach a data value. `None` and `Some("")` both leave `data` out.
    pub fn with_data(mut self, value: Option<&str>) -> Self {
        self.data = value.filter(|v| !v.is_empty()).map(str::to_owned);
        self
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn resource(&self) -> &str {
        &self.resource_address
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

// ── Status ──────────────────────────────────────────────────────────

/// Where a polled request stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Succeeded,
    InProgress,
    /// Any other status string. All of them end polling.
    Terminal,
}

/// A response from `GET actions/requests/{id}`.
///
/// Keeps the raw JSON so it can be shown as-is when there is no result
/// data to decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionStatus {
    status: String,
    raw: Value,
}

impl ActionStatus {
    /// Validate a poll response. `status` must be a string.
    pub fn from_response(resp: ApiResponse) -> Result<Self, Error> {
        let status = resp.require_str("status")?;
        Ok(Self {
            status,
            raw: resp.body,
        })
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn state(&self) -> PollState {
        match self.status.as_str() {
            "SUCCEEDED" => PollState::Succeeded,
            "IN_PROGRESS" => PollState::InProgress,
            _ => PollState::Terminal,
        }
    }

    /// The whole response body.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// `resultData`, if the response has any.
    pub fn result_data(&self) -> Option<&Value> {
        self.raw.get("resultData")
    }

    /// `resultData.payload` when it is a non-empty string.
    pub fn payload(&self) -> Option<&str> {
        self.result_data()?
            .get("payload")?
            .as_str()
            .filter(|p| !p.is_empty())
    }
}

// ── Polling ─────────────────────────────────────────────────────────

/// Attempt budget for polling a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status requests. Values below 1 are treated as 1.
    pub attempts: u32,
    /// Pause between consecutive status requests.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 20,
            interval: Duration::from_secs(1),
        }
    }
}

/// How a polled request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The device reported `SUCCEEDED`.
    Succeeded { response: ActionStatus, attempts: u32 },
    /// Any status other than `SUCCEEDED` or `IN_PROGRESS`.
    Failed { response: ActionStatus, attempts: u32 },
    /// Still `IN_PROGRESS` after the last permitted attempt. `last` is the
    /// final (non-terminal) response.
    TimedOut { last: ActionStatus, attempts: u32 },
}

impl ActionOutcome {
    /// The last response fetched, whatever the outcome.
    pub fn response(&self) -> &ActionStatus {
        match self {
            Self::Succeeded { response, .. } | Self::Failed { response, .. } => response,
            Self::TimedOut { last, .. } => last,
        }
    }

    /// Number of status requests made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. }
            | Self::Failed { attempts, .. }
            | Self::TimedOut { attempts, .. } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
            Self::TimedOut { .. } => "timed-out",
        }
    }
}

/// A submitted action and how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub request_id: String,
    pub outcome: ActionOutcome,
}

// ── Endpoints ───────────────────────────────────────────────────────

impl NceClient {
    /// Submit an action without waiting for it.
    ///
    /// `POST {device_url}/{device_id}/actions/LWM2M`. Returns the request
    /// `id` to poll; a response without one is an `UnexpectedResponse`.
    pub async fn submit_action(&self, request: &ActionRequest) -> Result<String, Error> {
        let url = self.device_url("actions/LWM2M")?;
        debug!(
            action = %request.action(),
            resource = request.resource(),
            "submitting action"
        );
        let resp = self.post(url, request).await?;
        resp.require_str("id")
    }

    /// Fetch the current status of a submitted request.
    ///
    /// `GET {device_url}/actions/requests/{id}`
    pub async fn action_status(&self, request_id: &str) -> Result<ActionStatus, Error> {
        let url = self.device_api_url(&format!("actions/requests/{request_id}"))?;
        let resp = self.get(url).await?;
        ActionStatus::from_response(resp)
    }

    /// Poll a request until it leaves `IN_PROGRESS` or the policy's attempt
    /// budget is spent.
    ///
    /// `on_attempt` sees every fetched status with its 1-based attempt
    /// number. There is no pause after the final attempt.
    pub async fn poll_action(
        &self,
        request_id: &str,
        mut on_attempt: impl FnMut(u32, &ActionStatus) + Send,
    ) -> Result<ActionOutcome, Error> {
        let max_attempts = self.poll_policy().attempts.max(1);
        let interval = self.poll_policy().interval;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self.action_status(request_id).await?;
            on_attempt(attempt, &response);

            match response.state() {
                PollState::Succeeded => {
                    debug!(request_id, attempt, "request succeeded");
                    return Ok(ActionOutcome::Succeeded {
                        response,
                        attempts: attempt,
                    });
                }
                PollState::Terminal => {
                    debug!(request_id, attempt, status = response.status(), "request failed");
                    return Ok(ActionOutcome::Failed {
                        response,
                        attempts: attempt,
                    });
                }
                PollState::InProgress if attempt >= max_attempts => {
                    warn!(request_id, attempt, "request still in progress, giving up");
                    return Ok(ActionOutcome::TimedOut {
                        last: response,
                        attempts: attempt,
                    });
                }
                PollState::InProgress => tokio::time::sleep(interval).await,
            }
        }
    }

    /// Submit an action and poll it to completion.
    pub async fn perform(
        &self,
        request: &ActionRequest,
        on_attempt: impl FnMut(u32, &ActionStatus) + Send,
    ) -> Result<ActionReport, Error> {
        let request_id = self.submit_action(request).await?;
        debug!(request_id, "action accepted");
        let outcome = self.poll_action(&request_id, on_attempt).await?;
        Ok(ActionReport {
            request_id,
            outcome,
        })
    }

    /// Read a resource.
    pub async fn read(&self, resource: &str) -> Result<ActionReport, Error> {
        self.perform(&ActionRequest::new(ActionKind::Read, resource), |_, _| {})
            .await
    }

    /// Write a value to a resource. An empty or absent value sends no `data`.
    pub async fn write(&self, resource: &str, value: Option<&str>) -> Result<ActionReport, Error> {
        let request = ActionRequest::new(ActionKind::Write, resource).with_data(value);
        self.perform(&request, |_, _| {}).await
    }

    /// Execute a resource.
    pub async fn exec(&self, resource: &str) -> Result<ActionReport, Error> {
        self.perform(&ActionRequest::new(ActionKind::Execute, resource), |_, _| {})
            .await
    }

    /// Start observing a resource.
    pub async fn observe_start(&self, resource: &str) -> Result<ActionReport, Error> {
        let request = ActionRequest::new(ActionKind::ObserveStart, resource);
        self.perform(&request, |_, _| {}).await
    }

    /// Stop observing a resource.
    pub async fn observe_stop(&self, resource: &str) -> Result<ActionReport, Error> {
        let request = ActionRequest::new(ActionKind::ObserveStop, resource);
        self.perform(&request, |_, _| {}).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::str::FromStr;

    fn status(body: Value) -> ActionStatus {
        ActionStatus::from_response(ApiResponse {
            status: StatusCode::OK,
            body,
        })
        .unwrap()
    }

    #[test]
    fn action_kind_wire_names() {
        assert_eq!(ActionKind::ObserveStart.to_string(), "observe-start");
        assert_eq!(ActionKind::Execute.to_string(), "execute");
        assert_eq!(
            ActionKind::from_str("observe-stop").unwrap(),
            ActionKind::ObserveStop
        );
        assert_eq!(
            serde_json::to_value(ActionKind::ObserveStop).unwrap(),
            json!("observe-stop")
        );
    }

    #[test]
    fn request_without_data_omits_field() {
        let req = ActionRequest::new(ActionKind::Read, "/3/0/1");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "requestMode": "SEND_NOW",
                "sendAttempts": 1,
                "action": "read",
                "resourceAddress": "/3/0/1"
            })
        );
    }

    #[test]
    fn request_with_data_includes_field() {
        let req = ActionRequest::new(ActionKind::Write, "/1/0/1").with_data(Some("300"));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["data"], json!("300"));
        assert_eq!(value["action"], json!("write"));
    }

    #[test]
    fn empty_data_is_treated_as_absent() {
        let req = ActionRequest::new(ActionKind::Write, "/1/0/1").with_data(Some(""));
        assert_eq!(req.data(), None);
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("data").is_none());
    }

    #[test]
    fn poll_state_classification() {
        assert_eq!(status(json!({"status": "SUCCEEDED"})).state(), PollState::Succeeded);
        assert_eq!(status(json!({"status": "IN_PROGRESS"})).state(), PollState::InProgress);
        assert_eq!(status(json!({"status": "FAILED"})).state(), PollState::Terminal);
        assert_eq!(status(json!({"status": "EXPIRED"})).state(), PollState::Terminal);
    }

    #[test]
    fn missing_status_is_unexpected_response() {
        let result = ActionStatus::from_response(ApiResponse {
            status: StatusCode::NOT_FOUND,
            body: json!({"message": "not found"}),
        });
        assert!(matches!(
            result,
            Err(Error::UnexpectedResponse {
                field: "status",
                status: 404,
                ..
            })
        ));
    }

    #[test]
    fn payload_requires_non_empty_string() {
        let with = status(json!({"status": "SUCCEEDED", "resultData": {"payload": "AA=="}}));
        assert_eq!(with.payload(), Some("AA=="));

        let empty = status(json!({"status": "SUCCEEDED", "resultData": {"payload": ""}}));
        assert_eq!(empty.payload(), None);
        assert!(empty.result_data().is_some());

        let none = status(json!({"status": "SUCCEEDED"}));
        assert_eq!(none.payload(), None);
        assert!(none.result_data().is_none());
    }
}
