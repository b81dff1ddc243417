//! Active call summaries for the dashboard.

use serde::Serialize;

use crate::upstream::{ActiveCall, CallDirection};

/// Call status as presented to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStatus {
    pub presence_id: String,
    pub direction: CallDirection,
    /// Caller number for inbound calls, callee number for outbound ones.
    pub other_party: String,
    pub duration: u64,
    pub answered: bool,
}

/// Reduce raw upstream call records to dashboard summaries.
pub fn summarize(calls: Vec<ActiveCall>) -> Vec<CallStatus> {
    calls
        .into_iter()
        .map(|call| {
            let other_party = match call.direction {
                CallDirection::Inbound => call.caller_id_number,
                CallDirection::Outbound => call.callee_id_number,
            };
            CallStatus {
                presence_id: call.user.presence_id,
                direction: call.direction,
                other_party,
                duration: call.duration_in_seconds,
                answered: call.answered,
            }
        })
        .collect()
}
