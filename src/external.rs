//! External generation-service boundary.
//!
//! The surrounding system may delegate timetable construction to an
//! external generation service that returns JSON shaped like
//! [`GeneratedSchedule`]. That response is adversarial input: this
//! module decodes it against a strict schema (unknown or missing
//! fields are rejected) and then runs the full conflict validator
//! before the schedule may be accepted. There is no bypass, and a
//! retried exchange is re-validated from scratch — a retry must never
//! be assumed to return the same schedule.
//!
//! The network exchange itself lives outside this crate, behind
//! [`ScheduleSource`]; transport failures surface as retry-eligible
//! [`TransportError`] values and are never substituted with a partial
//! or fabricated schedule.

use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{GeneratedSchedule, GenerationRequest, ScheduleSlot};
use crate::validation::{validate_schedule, Conflict, ValidatorOptions};

/// Failure of the exchange with the external service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level failure; eligible for retry.
    #[error("network failure: {0}")]
    Network(String),
    /// The exchange exceeded its deadline; eligible for retry.
    #[error("generation timed out after {0} ms")]
    Timeout(u64),
    /// The user abandoned the exchange.
    #[error("generation was cancelled")]
    Cancelled,
    /// The response is not valid JSON of the agreed shape.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Why an externally sourced schedule was not accepted.
#[derive(Debug, Error)]
pub enum AcceptError {
    /// The exchange itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The schedule decoded but violates hard invariants.
    #[error("schedule rejected with {} conflict(s)", .0.len())]
    Rejected(Vec<Conflict>),
}

/// A collaborator that produces raw schedule JSON for a request.
///
/// Implementations wrap whatever wire protocol the deployment uses.
/// They must be cancellable and idempotent to retry; callers treat
/// every response as untrusted regardless of retry count.
pub trait ScheduleSource {
    /// Performs one exchange, returning the raw response body.
    fn fetch(&self, request: &GenerationRequest) -> Result<String, TransportError>;
}

/// Wire shape of one slot. Strict: unknown fields and missing fields
/// both fail the decode.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WireSlot {
    day_index: u32,
    period_index: u32,
    class_id: String,
    teacher_id: String,
    subject_id: String,
}

/// Wire shape of the whole response.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireSchedule {
    slots: Vec<WireSlot>,
}

/// Decodes raw response JSON into a schedule, schema-strictly.
///
/// Decoding proves shape only; the result still carries no integrity
/// guarantees and must pass [`accept_schedule`]'s validation before
/// display.
pub fn decode_schedule(raw: &str) -> Result<GeneratedSchedule, TransportError> {
    let wire: WireSchedule = serde_json::from_str(raw)?;
    let mut schedule = GeneratedSchedule::new();
    for slot in wire.slots {
        schedule.add_slot(ScheduleSlot::new(
            slot.day_index,
            slot.period_index,
            slot.class_id,
            slot.teacher_id,
            slot.subject_id,
        ));
    }
    Ok(schedule)
}

/// Decodes and fully validates an external response.
///
/// Every hard invariant is checked: double-bookings, foreign
/// identifiers, and out-of-grid cells all block acceptance.
pub fn accept_schedule(
    raw: &str,
    request: &GenerationRequest,
) -> Result<GeneratedSchedule, AcceptError> {
    let schedule = decode_schedule(raw)?;
    match validate_schedule(&schedule, request, ValidatorOptions::all()) {
        Ok(()) => Ok(schedule),
        Err(conflicts) => {
            warn!(
                "rejected external schedule: {} conflict(s), first: {}",
                conflicts.len(),
                conflicts[0].message
            );
            Err(AcceptError::Rejected(conflicts))
        }
    }
}

/// Runs one exchange against a source and validates the response.
pub fn generate_via<S: ScheduleSource>(
    source: &S,
    request: &GenerationRequest,
) -> Result<GeneratedSchedule, AcceptError> {
    let raw = source.fetch(request).map_err(AcceptError::Transport)?;
    accept_schedule(&raw, request)
}
