// ============================================================================
// JSON Parsing Functions
// ============================================================================
//
// Convenience string-based parsing for section schedule payloads, used by
// test fixtures and by host applications that cache a backend response to
// disk and rehydrate it later.

use anyhow::{Context, Result};

use crate::api::SectionScheduleData;

fn validate_payload(payload_json: &str) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(payload_json).context("Invalid section schedule JSON")?;
    let has_subjects = value
        .as_object()
        .and_then(|obj| obj.get("subjects"))
        .is_some();
    if !has_subjects {
        anyhow::bail!("Missing required 'subjects' field");
    }
    Ok(())
}

/// Parse a section schedule payload from a JSON string.
///
/// The payload is the `fetch_section_schedule` response shape: a section id,
/// semester metadata, and the subject requirements with their nested
/// `schedule_slots`.
pub fn parse_section_schedule_json(payload_json: &str) -> Result<SectionScheduleData> {
    validate_payload(payload_json)?;

    let data: SectionScheduleData = serde_json::from_str(payload_json)
        .context("Failed to deserialize section schedule JSON")?;

    for subject in &data.subjects {
        for slot in &subject.schedule_slots {
            if !slot.time_span_valid() {
                anyhow::bail!(
                    "Slot for subject {} has start {} not before end {}",
                    subject.subject_code,
                    slot.start_time,
                    slot.end_time
                );
            }
        }
    }

    Ok(data)
}
