//! Request dispatcher for the status function.
//!
//! The host hands over an event of the form
//! `{"Details": {"Parameters": {...}}}`. The parameter bag selects one of
//! three operations, checked in this order: `function`, `change_status`,
//! `check_auth`. The first key present wins.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, Instrument};

use crate::config::{AppConfig, AuthPolicy};
use crate::error::{HandlerError, ValidationError};
use crate::status::{AuthGate, ChangeStatusResponse, StatusMachine, StatusResponse};
use crate::store::StatusStore;
use crate::telemetry::{create_invocation_span, generate_correlation_id};

#[derive(Debug, Default, Deserialize)]
pub struct InvocationEvent {
    #[serde(rename = "Details", default)]
    pub details: Option<EventDetails>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventDetails {
    #[serde(rename = "Parameters", default)]
    pub parameters: Option<Map<String, Value>>,
}

impl InvocationEvent {
    pub fn parameters(&self) -> Map<String, Value> {
        self.details
            .as_ref()
            .and_then(|d| d.parameters.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusRequest {
    GetStatus { status_type: String },
    ChangeStatus { command: String, auth_code: Option<String> },
    CheckAuth { code: Option<String> },
}

impl StatusRequest {
    pub fn from_parameters(params: &Map<String, Value>) -> Result<Self, ValidationError> {
        if params.contains_key("function") {
            let function = string_param(params, "function")?.unwrap_or_default();
            info!(function = %function, "Function requested");
            return match function.as_str() {
                "get_status" => Ok(StatusRequest::GetStatus {
                    status_type: string_param(params, "status_type")?.unwrap_or_default(),
                }),
                _ => Err(ValidationError::UnknownFunction(function)),
            };
        }

        if params.contains_key("change_status") {
            return Ok(StatusRequest::ChangeStatus {
                command: string_param(params, "change_status")?.unwrap_or_default(),
                auth_code: string_param(params, "auth_code")?,
            });
        }

        if params.contains_key("check_auth") {
            return Ok(StatusRequest::CheckAuth {
                code: string_param(params, "check_auth")?,
            });
        }

        Err(ValidationError::MissingParameters)
    }
}

/// `null` and a missing key both read as `None`; other non-string values are rejected.
fn string_param(params: &Map<String, Value>, key: &str) -> Result<Option<String>, ValidationError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::InvalidParameter {
            key: key.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponse {
    #[serde(rename = "AuthCodeStatus")]
    pub auth_code_status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatusFunctionResponse {
    Status(StatusResponse),
    Changed(ChangeStatusResponse),
    Auth(AuthResponse),
}

pub struct StatusDispatcher {
    machine: StatusMachine,
    auth: AuthGate,
    policy: AuthPolicy,
}

impl StatusDispatcher {
    pub fn new(machine: StatusMachine, auth: AuthGate, policy: AuthPolicy) -> Self {
        Self {
            machine,
            auth,
            policy,
        }
    }

    pub fn from_config(config: &AppConfig, store: Arc<dyn StatusStore>) -> Self {
        Self::new(
            StatusMachine::new(store, config.status.id_map()),
            AuthGate::new(config.auth.valid_code_set()),
            config.auth.policy,
        )
    }

    /// Run one invocation of the status function.
    pub async fn handle_event(&self, event: Value) -> Result<StatusFunctionResponse, HandlerError> {
        let correlation_id = generate_correlation_id();
        let span = create_invocation_span("status", &correlation_id);

        async move {
            info!(event = %event, "Status function triggered");
            let result = self.handle_value(event).await;
            if let Err(e) = &result {
                error!(error = %e, kind = ?e.kind(), "Status function failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn handle_value(&self, event: Value) -> Result<StatusFunctionResponse, HandlerError> {
        let event: InvocationEvent = serde_json::from_value(event)
            .map_err(|e| ValidationError::MalformedEvent(e.to_string()))?;
        let request = StatusRequest::from_parameters(&event.parameters())?;
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: StatusRequest) -> Result<StatusFunctionResponse, HandlerError> {
        match request {
            StatusRequest::GetStatus { status_type } => {
                let response = self.machine.get_status(&status_type).await?;
                Ok(StatusFunctionResponse::Status(response))
            }
            StatusRequest::ChangeStatus { command, auth_code } => {
                info!(command = %command, "Change status request");
                if self.policy == AuthPolicy::Inline
                    && !self.auth.check_auth_code(auth_code.as_deref())
                {
                    return Err(ValidationError::Unauthorized.into());
                }
                let response = self.machine.change_status(&command).await?;
                Ok(StatusFunctionResponse::Changed(response))
            }
            StatusRequest::CheckAuth { code } => {
                info!("Auth check request");
                Ok(StatusFunctionResponse::Auth(AuthResponse {
                    auth_code_status: self.auth.check_auth_code(code.as_deref()),
                }))
            }
        }
    }
}
