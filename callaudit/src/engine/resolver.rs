use chrono::Duration;

use crate::engine::index::{CallIndex, FromMatch};
use crate::models::{CallRecord, Direction};
use crate::phone;

/// Tolerance for clock skew between the anchor row and a near-simultaneous
/// callback row in the same log.
const CALLBACK_GRACE_SECS: i64 = 10;
const PROMPT_WINDOW_HOURS: i64 = 1;
const LATE_WINDOW_HOURS: i64 = 10;

/// A connected-but-brief outbound dial still counts as an attempted
/// follow-up.
pub const MIN_NURSE_CALLBACK_SECS: u32 = 1;
/// A patient call-in only counts as a reciprocal contact if an actual
/// conversation happened.
pub const MIN_PATIENT_CALLBACK_SECS: u32 = 30;

/// The four priority-ordered time/party windows searched for a qualifying
/// follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackTier {
    NurseWithinHour,
    PatientWithinHour,
    NurseWithinTenHours,
    PatientWithinTenHours,
}

#[derive(Debug, Clone)]
pub struct CallbackMatch<'a> {
    pub tier: CallbackTier,
    pub record: &'a CallRecord,
}

/// Searches the log for a qualifying follow-up to an unanswered inbound
/// call. Tiers are tried in strict priority order and the first hit wins,
/// so a call qualifying for an earlier tier is never reported under a
/// later one.
pub fn resolve<'a>(anchor: &CallRecord, index: &'a CallIndex) -> Option<CallbackMatch<'a>> {
    // Nurse callback: the agent's line dials the patient back.
    let nurse_to_suffix = phone::suffix10(&anchor.from_number);
    let nurse_from = FromMatch::Exact(phone::normalize(&anchor.to_number));
    // Patient callback: the patient reaches the agent's line again.
    let patient_to_suffix = phone::suffix10(&anchor.to_number);
    let patient_from = FromMatch::Suffix(phone::suffix10(&anchor.from_number));

    let prompt_start = anchor.start_time - Duration::seconds(CALLBACK_GRACE_SECS);
    let prompt_end = anchor.start_time + Duration::hours(PROMPT_WINDOW_HOURS);
    // The late window excludes the one-hour boundary itself; timestamps
    // in the log are second-resolution.
    let late_start = prompt_end + Duration::seconds(1);
    let late_end = anchor.start_time + Duration::hours(LATE_WINDOW_HOURS);

    let tiers = [
        (
            CallbackTier::NurseWithinHour,
            Direction::Outbound,
            &nurse_to_suffix,
            &nurse_from,
            prompt_start,
            prompt_end,
            MIN_NURSE_CALLBACK_SECS,
        ),
        (
            CallbackTier::PatientWithinHour,
            Direction::Inbound,
            &patient_to_suffix,
            &patient_from,
            prompt_start,
            prompt_end,
            MIN_PATIENT_CALLBACK_SECS,
        ),
        (
            CallbackTier::NurseWithinTenHours,
            Direction::Outbound,
            &nurse_to_suffix,
            &nurse_from,
            late_start,
            late_end,
            MIN_NURSE_CALLBACK_SECS,
        ),
        (
            CallbackTier::PatientWithinTenHours,
            Direction::Inbound,
            &patient_to_suffix,
            &patient_from,
            late_start,
            late_end,
            MIN_PATIENT_CALLBACK_SECS,
        ),
    ];

    for (tier, direction, to_suffix, from, window_start, window_end, min_duration) in tiers {
        if let Some(record) =
            index.find_earliest(direction, to_suffix, from, window_start, window_end, min_duration)
        {
            return Some(CallbackMatch { tier, record });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    const NURSE: &str = "+15550001111";
    const PATIENT: &str = "+15552223333";

    fn ts(time: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_time(time.parse().unwrap())
    }

    fn call(direction: Direction, from: &str, to: &str, start: &str, duration: u32) -> CallRecord {
        CallRecord {
            from_number: from.to_string(),
            to_number: to.to_string(),
            direction,
            start_time: ts(start),
            answer_time: None,
            end_time: None,
            duration_seconds: duration,
        }
    }

    fn anchor() -> CallRecord {
        // Missed inbound call from the patient at 10:00, rang 5 seconds.
        call(Direction::Inbound, PATIENT, NURSE, "10:00:00", 5)
    }

    #[test]
    fn nurse_callback_within_hour() {
        let index = CallIndex::build(vec![call(
            Direction::Outbound,
            NURSE,
            PATIENT,
            "10:30:00",
            12,
        )]);
        let matched = resolve(&anchor(), &index).unwrap();
        assert_eq!(matched.tier, CallbackTier::NurseWithinHour);
        assert_eq!(matched.record.start_time, ts("10:30:00"));
    }

    #[test]
    fn nurse_callback_between_one_and_ten_hours() {
        let index = CallIndex::build(vec![call(
            Direction::Outbound,
            NURSE,
            PATIENT,
            "14:00:00",
            12,
        )]);
        let matched = resolve(&anchor(), &index).unwrap();
        assert_eq!(matched.tier, CallbackTier::NurseWithinTenHours);
    }

    #[test]
    fn no_qualifying_callback() {
        // Unrelated traffic only.
        let index = CallIndex::build(vec![
            call(Direction::Outbound, NURSE, "+15557778888", "10:30:00", 60),
            call(Direction::Inbound, "+15557778888", NURSE, "11:00:00", 90),
        ]);
        assert!(resolve(&anchor(), &index).is_none());
    }

    #[test]
    fn patient_callback_requires_thirty_seconds() {
        let short = CallIndex::build(vec![call(
            Direction::Inbound,
            PATIENT,
            NURSE,
            "10:45:00",
            10,
        )]);
        assert!(resolve(&anchor(), &short).is_none());

        let real = CallIndex::build(vec![call(
            Direction::Inbound,
            PATIENT,
            NURSE,
            "10:45:00",
            31,
        )]);
        let matched = resolve(&anchor(), &real).unwrap();
        assert_eq!(matched.tier, CallbackTier::PatientWithinHour);
    }

    #[test]
    fn nurse_tier_outranks_patient_tier() {
        let index = CallIndex::build(vec![
            call(Direction::Inbound, PATIENT, NURSE, "10:10:00", 60),
            call(Direction::Outbound, NURSE, PATIENT, "10:50:00", 5),
        ]);
        // The later nurse dial still wins over the earlier patient call-in.
        let matched = resolve(&anchor(), &index).unwrap();
        assert_eq!(matched.tier, CallbackTier::NurseWithinHour);
    }

    #[test]
    fn prompt_tier_never_leaks_into_late_tier() {
        // Qualifies within the hour, so the late tiers must not see it
        // even though it also sits inside the ten-hour span.
        let index = CallIndex::build(vec![call(
            Direction::Outbound,
            NURSE,
            PATIENT,
            "10:59:59",
            12,
        )]);
        let matched = resolve(&anchor(), &index).unwrap();
        assert_eq!(matched.tier, CallbackTier::NurseWithinHour);
    }

    #[test]
    fn grace_window_covers_near_simultaneous_logging() {
        let index = CallIndex::build(vec![call(
            Direction::Outbound,
            NURSE,
            PATIENT,
            "09:59:52",
            12,
        )]);
        let matched = resolve(&anchor(), &index).unwrap();
        assert_eq!(matched.tier, CallbackTier::NurseWithinHour);
    }

    #[test]
    fn callback_outside_ten_hours_does_not_count() {
        let index = CallIndex::build(vec![call(
            Direction::Outbound,
            NURSE,
            PATIENT,
            "20:00:01",
            12,
        )]);
        assert!(resolve(&anchor(), &index).is_none());
    }

    #[test]
    fn exactly_one_hour_belongs_to_the_prompt_tier() {
        let index = CallIndex::build(vec![call(
            Direction::Outbound,
            NURSE,
            PATIENT,
            "11:00:00",
            12,
        )]);
        let matched = resolve(&anchor(), &index).unwrap();
        assert_eq!(matched.tier, CallbackTier::NurseWithinHour);
    }

    #[test]
    fn patient_callback_matches_across_country_codes() {
        let anchor = call(Direction::Inbound, "5552223333", NURSE, "10:00:00", 5);
        let index = CallIndex::build(vec![call(
            Direction::Inbound,
            "+15552223333",
            NURSE,
            "12:30:00",
            45,
        )]);
        let matched = resolve(&anchor, &index).unwrap();
        assert_eq!(matched.tier, CallbackTier::PatientWithinTenHours);
    }
}
