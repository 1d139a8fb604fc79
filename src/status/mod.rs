//! Operational status state machine.
//!
//! Two durable flags, `SC Emergency Mode` and `FES Meeting Mode`, are driven by
//! four [`TransitionCommand`]s. Mutual exclusion between the two modes comes
//! only from the activation write tables; nothing re-reads the store before
//! writing, so concurrent activations of different modes can still leave both
//! flags set.
//!
//! [`StatusMachine`] does not check authorization itself. Callers gate
//! `change_status` with [`AuthGate::check_auth_code`] (see the dispatcher).

mod auth;
mod transition;

pub use auth::AuthGate;
pub use transition::{TransitionCommand, EMERGENCY_MODE, MEETING_MODE};

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::{HandlerError, StoreAccessError};
use crate::store::{StatusRecord, StatusStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub status: bool,
}

/// Result of a successful transition: the message plus the logical key/value
/// pairs that were written, taken from the plan rather than read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeStatusResponse {
    pub message: String,
    #[serde(flatten)]
    pub updates: BTreeMap<String, bool>,
}

/// One write of a transition plan, with the logical key already resolved to a store id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub logical_key: &'static str,
    pub store_id: String,
    pub value: bool,
}

pub struct StatusMachine {
    store: Arc<dyn StatusStore>,
    id_map: HashMap<String, String>,
}

impl StatusMachine {
    pub fn new(store: Arc<dyn StatusStore>, id_map: HashMap<String, String>) -> Self {
        Self { store, id_map }
    }

    /// Store id for a logical key; keys absent from the map are used as-is.
    pub fn store_id<'a>(&'a self, logical_key: &'a str) -> &'a str {
        self.id_map
            .get(logical_key)
            .map(String::as_str)
            .unwrap_or(logical_key)
    }

    /// Read one flag. A record that was never written reads as `false`.
    pub async fn get_status(&self, status_type: &str) -> Result<StatusResponse, StoreAccessError> {
        let key = self.store_id(status_type);
        info!(status_type, key, "Fetching status");

        let record = self.store.get(key).await.map_err(|e| {
            error!(key, error = %e, "Error fetching status");
            StoreAccessError::read(key, e)
        })?;

        let status = record.map(|r| r.status).unwrap_or(false);
        info!(key, status, "Determined status");
        Ok(StatusResponse { status })
    }

    /// Ordered writes for `command`, with store ids resolved.
    pub fn plan(&self, command: TransitionCommand) -> Vec<PlannedWrite> {
        command
            .updates()
            .iter()
            .map(|&(logical_key, value)| PlannedWrite {
                logical_key,
                store_id: self.store_id(logical_key).to_string(),
                value,
            })
            .collect()
    }

    /// Apply a transition command.
    ///
    /// The command is validated before any store access. Writes go out one at
    /// a time in plan order; on the first failure the error carries its index
    /// and the keys already written, which stay written.
    pub async fn change_status(&self, command: &str) -> Result<ChangeStatusResponse, HandlerError> {
        info!(command, "Changing status");
        let command = command.parse::<TransitionCommand>().map_err(|e| {
            error!(error = %e, "Rejected status change");
            e
        })?;

        let plan = self.plan(command);
        let mut applied = Vec::with_capacity(plan.len());

        for (index, write) in plan.iter().enumerate() {
            info!(id = %write.store_id, status = write.value, "Updating status item");
            if let Err(e) = self
                .store
                .put(StatusRecord::new(write.store_id.clone(), write.value))
                .await
            {
                error!(
                    id = %write.store_id,
                    write_index = index,
                    applied = ?applied,
                    error = %e,
                    "Error updating status"
                );
                return Err(StoreAccessError::write(write.store_id.clone(), index, applied, e).into());
            }
            applied.push(write.logical_key.to_string());
        }

        info!(%command, "Status update successful");
        Ok(ChangeStatusResponse {
            message: format!("Status updated: {command}"),
            updates: plan
                .into_iter()
                .map(|w| (w.logical_key.to_string(), w.value))
                .collect(),
        })
    }
}
