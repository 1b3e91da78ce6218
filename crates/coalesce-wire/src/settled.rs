// Numan Thabit 2025
//! Per-call settled outcomes, order-aligned with the dispatched batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;

/// Outcome of one dispatched call.
///
/// A batch response carries exactly one of these per dispatched tuple, in
/// tuple order, regardless of how many individual calls fulfilled or failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SettledResult {
    /// The call's handler returned a value.
    Fulfilled {
        /// The value the handler returned.
        value: Value,
    },
    /// The call's handler raised.
    Rejected {
        /// The structured error the handler raised.
        reason: RpcError,
    },
}

impl SettledResult {
    /// Fulfilled outcome carrying `value`.
    pub fn fulfilled(value: Value) -> Self {
        SettledResult::Fulfilled { value }
    }

    /// Rejected outcome carrying `reason`.
    pub fn rejected(reason: RpcError) -> Self {
        SettledResult::Rejected { reason }
    }

    /// Whether the call fulfilled.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, SettledResult::Fulfilled { .. })
    }

    /// Collapse into the plain per-call result.
    pub fn into_outcome(self) -> Result<Value, RpcError> {
        match self {
            SettledResult::Fulfilled { value } => Ok(value),
            SettledResult::Rejected { reason } => Err(reason),
        }
    }

    /// Build from a plain per-call result.
    pub fn from_outcome(outcome: Result<Value, RpcError>) -> Self {
        match outcome {
            Ok(value) => SettledResult::fulfilled(value),
            Err(reason) => SettledResult::rejected(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_is_status_tagged() {
        let ok = SettledResult::fulfilled(json!({"id": 1}));
        assert_eq!(
            serde_json::to_value(&ok).expect("encode"),
            json!({"status": "fulfilled", "value": {"id": 1}})
        );

        let err = SettledResult::rejected(RpcError::not_found("no such id"));
        let encoded = serde_json::to_value(&err).expect("encode");
        assert_eq!(encoded["status"], "rejected");
        assert_eq!(encoded["reason"]["code"], 404);
        let decoded: SettledResult = serde_json::from_value(encoded).expect("decode");
        assert_eq!(decoded, err);
    }

    #[test]
    fn outcome_round_trips() {
        let outcome = SettledResult::fulfilled(json!(1)).into_outcome();
        assert_eq!(outcome, Ok(json!(1)));
        let settled = SettledResult::from_outcome(Err(RpcError::timeout("late")));
        assert!(!settled.is_fulfilled());
    }
}
