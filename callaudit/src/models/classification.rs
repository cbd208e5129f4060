use serde::{Deserialize, Serialize};

/// Closed set of audit outcomes for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallCategory {
    Answered,
    MissedNurseCallbackWithinHour,
    MissedPatientCallbackWithinHour,
    MissedNurseCallbackWithinTenHours,
    MissedPatientCallbackWithinTenHours,
    MissedNoCallback,
    Outbound,
    Unknown,
    Error,
}

impl CallCategory {
    /// Categories that satisfy the follow-up requirement: answered, or a
    /// qualifying callback within ten hours.
    pub fn met(self) -> bool {
        matches!(
            self,
            CallCategory::Answered
                | CallCategory::MissedNurseCallbackWithinHour
                | CallCategory::MissedPatientCallbackWithinHour
                | CallCategory::MissedNurseCallbackWithinTenHours
                | CallCategory::MissedPatientCallbackWithinTenHours
        )
    }

    pub fn not_met(self) -> bool {
        matches!(self, CallCategory::MissedNoCallback)
    }
}

/// Outcome of classifying one call record. Recomputed on every pass,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub category: CallCategory,
    pub detail: String,
}

impl ClassificationResult {
    pub fn new(category: CallCategory, detail: impl Into<String>) -> ClassificationResult {
        ClassificationResult {
            category,
            detail: detail.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> ClassificationResult {
        ClassificationResult {
            category: CallCategory::Error,
            detail: message.into(),
        }
    }
}

/// Summary counts for one classification pass over a date range.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateCounts {
    pub total: usize,
    pub inbound: usize,
    pub outbound: usize,
    pub answered: usize,
    pub nurse_callback_within_hour: usize,
    pub patient_callback_within_hour: usize,
    pub nurse_callback_within_ten_hours: usize,
    pub patient_callback_within_ten_hours: usize,
    pub no_callback: usize,
    pub unknown: usize,
    pub errors: usize,
    pub good_percentage: f64,
    pub bad_percentage: f64,
}
