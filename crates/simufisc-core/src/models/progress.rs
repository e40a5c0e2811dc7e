//! Progress snapshots and the event wire model.
//!
//! Snapshots are published by the broadcaster while a simulation runs.
//! On the wire each event is one JSON object:
//! `{"type":"progress"|"completed"|"error"|"heartbeat","data":{...}}`;
//! heartbeats carry no payload.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Account;

/// Lifecycle status of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationStatus {
    Draft,
    Running,
    Completed,
    Failed,
}

impl SimulationStatus {
    /// Check if this status ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimulationStatus::Completed | SimulationStatus::Failed)
    }
}

/// Indicative per-month tax figures shown while a run proceeds.
///
/// These are UX hints, not authoritative liabilities; none of them appear
/// in the final results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicativeTaxes {
    /// Absolute VAT account balance at the month just processed.
    pub tva: Decimal,
    /// Rough social-contribution estimate from the month's net revenue.
    pub urssaf: Decimal,
    /// Month net revenue plus signed month expenses.
    pub net_cash_flow: Decimal,
}

/// One element of the progress stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub simulation_id: String,
    pub status: SimulationStatus,
    /// Calendar month most recently processed (`1..=12`).
    pub current_month: u32,
    /// Percentage in `0..=100`, non-decreasing within a run.
    pub progress: u8,
    /// Partial closing balances; not authoritative until roll-forward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_balances: Option<BTreeMap<Account, Decimal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<IndicativeTaxes>,
    pub timestamp: DateTime<Utc>,
    /// Failure reason on terminal `failed` snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressSnapshot {
    pub fn new(simulation_id: impl Into<String>, status: SimulationStatus, progress: u8) -> Self {
        Self {
            simulation_id: simulation_id.into(),
            status,
            current_month: 0,
            progress,
            partial_balances: None,
            taxes: None,
            timestamp: Utc::now(),
            message: None,
        }
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.current_month = month;
        self
    }

    pub fn with_balances(mut self, balances: BTreeMap<Account, Decimal>) -> Self {
        self.partial_balances = Some(balances);
        self
    }

    pub fn with_taxes(mut self, taxes: IndicativeTaxes) -> Self {
        self.taxes = Some(taxes);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Wire event wrapping a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// Intermediate snapshot while the run proceeds.
    Progress(ProgressSnapshot),
    /// Terminal snapshot of a successful run.
    Completed(ProgressSnapshot),
    /// Terminal failure notice.
    Error { message: String },
    /// Liveness signal without a payload.
    Heartbeat,
}

impl ProgressEvent {
    /// Check if this event closes the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Completed(_) | ProgressEvent::Error { .. })
    }

    /// Snapshot payload, if the event carries one.
    pub fn snapshot(&self) -> Option<&ProgressSnapshot> {
        match self {
            ProgressEvent::Progress(s) | ProgressEvent::Completed(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn event_wire_shape() {
        let snapshot = ProgressSnapshot::new("sim-1", SimulationStatus::Running, 25)
            .with_month(1)
            .with_taxes(IndicativeTaxes {
                tva: dec!(2000),
                urssaf: dec!(4500),
                net_cash_flow: dec!(8000),
            });
        let json = serde_json::to_value(ProgressEvent::Progress(snapshot)).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["data"]["progress"], 25);
        assert_eq!(json["data"]["status"], "running");

        let heartbeat = serde_json::to_value(ProgressEvent::Heartbeat).unwrap();
        assert_eq!(heartbeat["type"], "heartbeat");
        assert!(heartbeat.get("data").is_none());

        let error = serde_json::to_value(ProgressEvent::Error {
            message: "boom".into(),
        })
        .unwrap();
        assert_eq!(error["type"], "error");
        assert_eq!(error["data"]["message"], "boom");
    }

    #[test]
    fn terminal_classification() {
        let done = ProgressEvent::Completed(ProgressSnapshot::new(
            "sim-1",
            SimulationStatus::Completed,
            100,
        ));
        assert!(done.is_terminal());
        assert!(!ProgressEvent::Heartbeat.is_terminal());
        assert!(SimulationStatus::Failed.is_terminal());
        assert!(!SimulationStatus::Running.is_terminal());
    }
}
