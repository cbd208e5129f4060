use crate::models::{AggregateCounts, CallCategory, ClassificationResult};

/// Folds classification results (already restricted to the caller's date
/// range) into summary counts. `good`/`bad` percentages are computed over
/// the records that unambiguously met or failed the follow-up criteria;
/// an empty denominator yields 0 for both rather than a division fault.
pub fn aggregate(results: &[ClassificationResult]) -> AggregateCounts {
    let mut counts = AggregateCounts::default();

    for result in results {
        counts.total += 1;
        match result.category {
            CallCategory::Answered => counts.answered += 1,
            CallCategory::MissedNurseCallbackWithinHour => counts.nurse_callback_within_hour += 1,
            CallCategory::MissedPatientCallbackWithinHour => {
                counts.patient_callback_within_hour += 1
            }
            CallCategory::MissedNurseCallbackWithinTenHours => {
                counts.nurse_callback_within_ten_hours += 1
            }
            CallCategory::MissedPatientCallbackWithinTenHours => {
                counts.patient_callback_within_ten_hours += 1
            }
            CallCategory::MissedNoCallback => counts.no_callback += 1,
            CallCategory::Outbound => counts.outbound += 1,
            CallCategory::Unknown => counts.unknown += 1,
            CallCategory::Error => counts.errors += 1,
        }
    }

    counts.inbound = counts.answered
        + counts.nurse_callback_within_hour
        + counts.patient_callback_within_hour
        + counts.nurse_callback_within_ten_hours
        + counts.patient_callback_within_ten_hours
        + counts.no_callback;

    let met = counts.answered
        + counts.nurse_callback_within_hour
        + counts.patient_callback_within_hour
        + counts.nurse_callback_within_ten_hours
        + counts.patient_callback_within_ten_hours;
    let not_met = counts.no_callback;

    if met + not_met > 0 {
        let denominator = (met + not_met) as f64;
        counts.good_percentage = met as f64 / denominator * 100.0;
        counts.bad_percentage = not_met as f64 / denominator * 100.0;
    }

    counts
}
