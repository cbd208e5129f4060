use crate::engine::index::CallIndex;
use crate::engine::resolver::{self, CallbackTier};
use crate::models::{CallCategory, CallEntry, CallRecord, ClassificationResult, Direction};

/// Talk time below this threshold does not count as a real conversation.
pub const MIN_CONVERSATION_SECS: u32 = 30;

/// Classifies a loaded entry, mapping rows that failed to parse to an
/// error result so the batch total stays consistent with the row count.
pub fn classify_entry(entry: &CallEntry, index: &CallIndex) -> ClassificationResult {
    match &entry.record {
        Ok(record) => classify(record, index),
        Err(message) => ClassificationResult::error(message.clone()),
    }
}

/// Classifies a single call against the rest of the agent's log. Purely
/// functional: no state is shared between calls.
pub fn classify(record: &CallRecord, index: &CallIndex) -> ClassificationResult {
    match record.direction {
        Direction::Other => ClassificationResult::new(
            CallCategory::Unknown,
            "call direction not recognized; excluded from the audit",
        ),
        Direction::Outbound => ClassificationResult::new(
            CallCategory::Outbound,
            "outbound call; follow-up rules apply to inbound calls only",
        ),
        Direction::Inbound => classify_inbound(record, index),
    }
}

fn classify_inbound(record: &CallRecord, index: &CallIndex) -> ClassificationResult {
    if !record.answered() {
        // A missed call whose own ring lasted 30s or more is read as
        // contact made on that same call. Long-standing quirk of the
        // upstream logs, kept as-is.
        if record.duration_seconds >= MIN_CONVERSATION_SECS {
            return ClassificationResult::new(
                CallCategory::MissedNurseCallbackWithinHour,
                format!(
                    "missed call at {} from {} rang {}s; counted as contact on the call itself",
                    record.start_time, record.from_number, record.duration_seconds
                ),
            );
        }

        return match resolver::resolve(record, index) {
            Some(matched) => {
                let (category, party) = match matched.tier {
                    CallbackTier::NurseWithinHour => {
                        (CallCategory::MissedNurseCallbackWithinHour, "nurse")
                    }
                    CallbackTier::PatientWithinHour => {
                        (CallCategory::MissedPatientCallbackWithinHour, "patient")
                    }
                    CallbackTier::NurseWithinTenHours => {
                        (CallCategory::MissedNurseCallbackWithinTenHours, "nurse")
                    }
                    CallbackTier::PatientWithinTenHours => {
                        (CallCategory::MissedPatientCallbackWithinTenHours, "patient")
                    }
                };
                ClassificationResult::new(
                    category,
                    format!(
                        "{} called back at {} ({} -> {}, {}s)",
                        party,
                        matched.record.start_time,
                        matched.record.from_number,
                        matched.record.to_number,
                        matched.record.duration_seconds
                    ),
                )
            }
            None => ClassificationResult::new(
                CallCategory::MissedNoCallback,
                format!(
                    "no qualifying callback within 10 hours of {}",
                    record.start_time
                ),
            ),
        };
    }

    if record.duration_seconds >= MIN_CONVERSATION_SECS {
        ClassificationResult::new(
            CallCategory::Answered,
            format!("answered, {}s conversation", record.duration_seconds),
        )
    } else {
        // Picked up but under the conversation threshold: does not meet
        // the criteria.
        ClassificationResult::new(
            CallCategory::MissedNoCallback,
            format!(
                "answered but lasted only {}s, under the {}s threshold",
                record.duration_seconds, MIN_CONVERSATION_SECS
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawCallRow;
    use chrono::{NaiveDate, NaiveDateTime};

    const NURSE: &str = "+15550001111";
    const PATIENT: &str = "+15552223333";

    fn ts(time: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_time(time.parse().unwrap())
    }

    fn call(
        direction: Direction,
        from: &str,
        to: &str,
        start: &str,
        answered_at: Option<&str>,
        duration: u32,
    ) -> CallRecord {
        CallRecord {
            from_number: from.to_string(),
            to_number: to.to_string(),
            direction,
            start_time: ts(start),
            answer_time: answered_at.map(ts),
            end_time: None,
            duration_seconds: duration,
        }
    }

    fn empty_index() -> CallIndex {
        CallIndex::build(Vec::new())
    }

    #[test]
    fn answered_long_call_is_answered() {
        // Scenario: inbound at 10:00, answered, 45s conversation.
        let record = call(
            Direction::Inbound,
            PATIENT,
            NURSE,
            "10:00:00",
            Some("10:00:05"),
            45,
        );
        let result = classify(&record, &empty_index());
        assert_eq!(result.category, CallCategory::Answered);
    }

    #[test]
    fn answered_short_call_does_not_meet_criteria() {
        let record = call(
            Direction::Inbound,
            PATIENT,
            NURSE,
            "10:00:00",
            Some("10:00:05"),
            12,
        );
        let result = classify(&record, &empty_index());
        assert_eq!(result.category, CallCategory::MissedNoCallback);
        assert!(result.detail.contains("under the 30s threshold"));
    }

    #[test]
    fn outbound_calls_are_never_audited() {
        let record = call(Direction::Outbound, NURSE, PATIENT, "10:00:00", None, 0);
        let result = classify(&record, &empty_index());
        assert_eq!(result.category, CallCategory::Outbound);
    }

    #[test]
    fn unrecognized_direction_is_unknown() {
        let record = call(Direction::Other, NURSE, PATIENT, "10:00:00", None, 40);
        let result = classify(&record, &empty_index());
        assert_eq!(result.category, CallCategory::Unknown);
    }

    #[test]
    fn missed_call_with_nurse_callback_within_hour() {
        let anchor = call(Direction::Inbound, PATIENT, NURSE, "10:00:00", None, 5);
        let index = CallIndex::build(vec![
            anchor.clone(),
            call(Direction::Outbound, NURSE, PATIENT, "10:30:00", None, 12),
        ]);
        let result = classify(&anchor, &index);
        assert_eq!(result.category, CallCategory::MissedNurseCallbackWithinHour);
    }

    #[test]
    fn missed_call_with_late_nurse_callback() {
        let anchor = call(Direction::Inbound, PATIENT, NURSE, "10:00:00", None, 5);
        let index = CallIndex::build(vec![
            anchor.clone(),
            call(Direction::Outbound, NURSE, PATIENT, "14:00:00", None, 12),
        ]);
        let result = classify(&anchor, &index);
        assert_eq!(
            result.category,
            CallCategory::MissedNurseCallbackWithinTenHours
        );
    }

    #[test]
    fn missed_call_with_no_callback_anywhere() {
        let anchor = call(Direction::Inbound, PATIENT, NURSE, "10:00:00", None, 5);
        let index = CallIndex::build(vec![anchor.clone()]);
        let result = classify(&anchor, &index);
        assert_eq!(result.category, CallCategory::MissedNoCallback);
    }

    #[test]
    fn long_ring_counts_as_contact_on_the_call_itself() {
        // Unanswered but rang 31s: the quirk branch, not no-callback.
        let anchor = call(Direction::Inbound, PATIENT, NURSE, "10:00:00", None, 31);
        let index = CallIndex::build(vec![anchor.clone()]);
        let result = classify(&anchor, &index);
        assert_eq!(result.category, CallCategory::MissedNurseCallbackWithinHour);
        assert!(result.detail.contains("contact on the call itself"));
    }

    #[test]
    fn unparseable_row_yields_error_result() {
        let entry = CallEntry::new(RawCallRow {
            from: PATIENT.to_string(),
            to: NURSE.to_string(),
            start_time: "not a time".to_string(),
            answer_time: String::new(),
            end_time: String::new(),
            duration: "5".to_string(),
            direction: "Inbound".to_string(),
        });
        let result = classify_entry(&entry, &empty_index());
        assert_eq!(result.category, CallCategory::Error);
        assert!(result.detail.contains("unparseable timestamp"));
    }
}
