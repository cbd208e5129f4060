use chrono::NaiveDateTime;
use common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Literal marker the phone platform writes for an inbound call that rang
/// without being picked up.
pub const NO_ANSWER_SENTINEL: &str = "--:--:--";

/// Timestamp formats the platform's CSV exports are known to use.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %I:%M:%S %p"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
    Other,
}

impl Direction {
    pub fn parse(raw: &str) -> Direction {
        match raw.trim().to_ascii_lowercase().as_str() {
            "inbound" => Direction::Inbound,
            "outbound" => Direction::Outbound,
            _ => Direction::Other,
        }
    }
}

/// One call-log row exactly as received from the record source.
#[derive(Debug, Clone, Serialize)]
pub struct RawCallRow {
    pub from: String,
    pub to: String,
    pub start_time: String,
    pub answer_time: String,
    pub end_time: String,
    pub duration: String,
    pub direction: String,
}

/// Parsed, validated call record. Constructed once at load time and
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct CallRecord {
    pub from_number: String,
    pub to_number: String,
    pub direction: Direction,
    pub start_time: NaiveDateTime,
    pub answer_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration_seconds: u32,
}

impl CallRecord {
    pub fn parse(row: &RawCallRow) -> Result<CallRecord> {
        let start_time = parse_timestamp(&row.start_time)?;
        let answer_time = parse_optional_timestamp(&row.answer_time)?;
        let end_time = parse_optional_timestamp(&row.end_time)?;

        if let Some(answered_at) = answer_time {
            if answered_at < start_time {
                return Err(Error::RecordParse(format!(
                    "answer time {} precedes start time {}",
                    answered_at, start_time
                )));
            }
        }

        Ok(CallRecord {
            from_number: row.from.trim().to_string(),
            to_number: row.to.trim().to_string(),
            direction: Direction::parse(&row.direction),
            start_time,
            answer_time,
            end_time,
            duration_seconds: parse_duration_seconds(&row.duration)?,
        })
    }

    pub fn answered(&self) -> bool {
        self.answer_time.is_some()
    }
}

/// Pairs a raw row with its parse outcome so rows that fail to parse still
/// reach the classification pass and receive a visible result.
#[derive(Debug, Clone)]
pub struct CallEntry {
    pub raw: RawCallRow,
    pub record: std::result::Result<CallRecord, String>,
}

impl CallEntry {
    pub fn new(raw: RawCallRow) -> CallEntry {
        let record = CallRecord::parse(&raw).map_err(|e| e.to_string());
        CallEntry { raw, record }
    }
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::RecordParse("missing timestamp".to_string()));
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    Err(Error::RecordParse(format!("unparseable timestamp '{}'", raw)))
}

fn parse_optional_timestamp(raw: &str) -> Result<Option<NaiveDateTime>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == NO_ANSWER_SENTINEL {
        return Ok(None);
    }
    parse_timestamp(raw).map(Some)
}

/// Durations arrive either as a bare seconds count or as `H:MM:SS`.
fn parse_duration_seconds(raw: &str) -> Result<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::RecordParse("missing duration".to_string()));
    }
    if let Ok(seconds) = raw.parse::<u32>() {
        return Ok(seconds);
    }

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<u32>();
        let minutes = parts[1].parse::<u32>();
        let seconds = parts[2].parse::<u32>();
        if let (Ok(h), Ok(m), Ok(s)) = (hours, minutes, seconds) {
            if m < 60 && s < 60 {
                return Ok(h * 3600 + m * 60 + s);
            }
        }
    }

    Err(Error::RecordParse(format!("unparseable duration '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(start: &str, answer: &str, duration: &str, direction: &str) -> RawCallRow {
        RawCallRow {
            from: "+15551234567".to_string(),
            to: "+15559876543".to_string(),
            start_time: start.to_string(),
            answer_time: answer.to_string(),
            end_time: String::new(),
            duration: duration.to_string(),
            direction: direction.to_string(),
        }
    }

    #[test]
    fn parses_iso_style_timestamps() {
        let record = CallRecord::parse(&row(
            "2024-03-05 10:00:00",
            "2024-03-05 10:00:07",
            "45",
            "Inbound",
        ))
        .unwrap();
        assert_eq!(record.direction, Direction::Inbound);
        assert!(record.answered());
        assert_eq!(record.duration_seconds, 45);
    }

    #[test]
    fn parses_us_style_timestamps() {
        let record = CallRecord::parse(&row(
            "03/05/2024 10:00:00 AM",
            "--:--:--",
            "5",
            "INBOUND",
        ))
        .unwrap();
        assert!(!record.answered());
        assert_eq!(record.start_time.format("%H:%M:%S").to_string(), "10:00:00");
    }

    #[test]
    fn sentinel_and_empty_mean_unanswered() {
        let unanswered = CallRecord::parse(&row("2024-03-05 10:00:00", "--:--:--", "5", "Inbound"));
        assert!(unanswered.unwrap().answer_time.is_none());
        let empty = CallRecord::parse(&row("2024-03-05 10:00:00", "", "5", "Inbound"));
        assert!(empty.unwrap().answer_time.is_none());
    }

    #[test]
    fn duration_accepts_clock_format() {
        let record =
            CallRecord::parse(&row("2024-03-05 10:00:00", "", "0:01:05", "Outbound")).unwrap();
        assert_eq!(record.duration_seconds, 65);
    }

    #[test]
    fn rejects_answer_before_start() {
        let err = CallRecord::parse(&row(
            "2024-03-05 10:00:00",
            "2024-03-05 09:59:00",
            "45",
            "Inbound",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("precedes"));
    }

    #[test]
    fn rejects_garbage_timestamp_and_duration() {
        assert!(CallRecord::parse(&row("soon", "", "45", "Inbound")).is_err());
        assert!(CallRecord::parse(&row("2024-03-05 10:00:00", "", "a while", "Inbound")).is_err());
    }

    #[test]
    fn unrecognized_direction_is_other() {
        assert_eq!(Direction::parse("Internal"), Direction::Other);
        assert_eq!(Direction::parse(""), Direction::Other);
        assert_eq!(Direction::parse(" outbound "), Direction::Outbound);
    }

    #[test]
    fn failed_parse_is_kept_on_the_entry() {
        let entry = CallEntry::new(row("not a time", "", "45", "Inbound"));
        assert!(entry.record.is_err());
        assert_eq!(entry.raw.duration, "45");
    }
}
