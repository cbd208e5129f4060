use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, StringArray};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use common::{Error, Result};

use crate::models::{CallEntry, RawCallRow};

/// Strips the platform's ` (local)` style suffix and normalizes case, so
/// `Start Time (local)` and `Start Time` resolve to the same column.
fn canonical_header(name: &str) -> String {
    let base = name.split(" (").next().unwrap_or(name);
    base.trim().to_ascii_lowercase()
}

struct Columns {
    from: usize,
    to: usize,
    start_time: usize,
    answer_time: usize,
    end_time: usize,
    duration: usize,
    direction: usize,
}

fn resolve_columns(schema: &Schema) -> Result<Columns> {
    let find = |name: &str| -> Result<usize> {
        schema
            .fields()
            .iter()
            .position(|field| canonical_header(field.name()) == name)
            .ok_or_else(|| Error::Decode(format!("call log is missing the '{}' column", name)))
    };

    Ok(Columns {
        from: find("from")?,
        to: find("to")?,
        start_time: find("start time")?,
        answer_time: find("answer time")?,
        end_time: find("end time")?,
        duration: find("duration")?,
        direction: find("direction")?,
    })
}

/// Decodes one agent's call-log CSV into entries. Every column is read as
/// text; typing happens in `CallRecord::parse` so a bad cell fails that
/// one record instead of the whole file.
pub fn decode_call_log(bytes: &[u8]) -> Result<Vec<CallEntry>> {
    let csv_format = Format::default().with_header(true);
    let (inferred, _) = csv_format
        .infer_schema(Cursor::new(bytes), Some(64))
        .map_err(|e| Error::Decode(format!("cannot read call log header: {}", e)))?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| Field::new(field.name().clone(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let columns = resolve_columns(&schema)?;

    let reader = ReaderBuilder::new(schema)
        .with_header(true)
        .build(Cursor::new(bytes))?;

    let mut entries = Vec::new();
    for batch in reader {
        let batch = batch?;
        let text_column = |idx: usize| -> Result<&StringArray> {
            batch
                .column(idx)
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| Error::Decode("call log column is not text".to_string()))
        };

        let from = text_column(columns.from)?;
        let to = text_column(columns.to)?;
        let start_time = text_column(columns.start_time)?;
        let answer_time = text_column(columns.answer_time)?;
        let end_time = text_column(columns.end_time)?;
        let duration = text_column(columns.duration)?;
        let direction = text_column(columns.direction)?;

        for row in 0..batch.num_rows() {
            let cell = |array: &StringArray| -> String {
                if array.is_null(row) {
                    String::new()
                } else {
                    array.value(row).to_string()
                }
            };

            entries.push(CallEntry::new(RawCallRow {
                from: cell(from),
                to: cell(to),
                start_time: cell(start_time),
                answer_time: cell(answer_time),
                end_time: cell(end_time),
                duration: cell(duration),
                direction: cell(direction),
            }));
        }
    }

    Ok(entries)
}
