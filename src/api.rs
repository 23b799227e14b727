//! Public API surface for the scheduling engine.
//!
//! This file consolidates the DTO types exchanged with the institution's
//! management backend. All types derive Serialize/Deserialize for JSON
//! serialization; the request/response shapes here are the wire contract.

use serde::{Deserialize, Serialize};

use crate::define_id_type;

define_id_type!(i64, SectionId);
define_id_type!(i64, SubjectId);
define_id_type!(i64, ProfessorId);
define_id_type!(i64, SectionSubjectId);
define_id_type!(i64, SlotId);
define_id_type!(i64, SemesterId);

pub use crate::models::time::TimeOfDay;

/// Day of the week.
///
/// The full week is retained in the domain model; the interactive grid only
/// ever displays [`Day::TEACHING_WEEK`] (Monday through Saturday).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Canonical Monday→Saturday ordering of the interactive grid.
    pub const TEACHING_WEEK: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Every day of the week in canonical order.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Three-letter display label.
    pub fn short_label(&self) -> &'static str {
        match self {
            Day::Monday => "Mon",
            Day::Tuesday => "Tue",
            Day::Wednesday => "Wed",
            Day::Thursday => "Thu",
            Day::Friday => "Fri",
            Day::Saturday => "Sat",
            Day::Sunday => "Sun",
        }
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        };
        write!(f, "{}", name)
    }
}

/// Delivery mode of a subject requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Lecture,
    Lab,
}

/// One placed teaching assignment: a subject occupying a day/time for a
/// section, optionally bound to a professor and a room.
///
/// `id` is `None` for a proposed slot that has not been saved yet. An unset
/// `room` means the room is still to be announced (TBA).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub id: Option<SlotId>,
    pub section_subject_id: SectionSubjectId,
    pub day: Day,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub professor_id: Option<ProfessorId>,
    #[serde(default)]
    pub room: Option<String>,
}

impl Slot {
    /// Whether the slot has been saved by the backend.
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Whether the start precedes the end.
    pub fn time_span_valid(&self) -> bool {
        self.start_time < self.end_time
    }

    /// Whether this slot intersects a `[start, end)` window on a day.
    pub fn overlaps_window(&self, day: Day, start: TimeOfDay, end: TimeOfDay) -> bool {
        self.day == day && self.start_time < end && start < self.end_time
    }

    /// Whether two slots share any (day, time) intersection.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.overlaps_window(other.day, other.start_time, other.end_time)
    }
}

/// One subject a section must eventually have a slot for.
///
/// `section_subject_id` is `None` until the backend has materialized the
/// section–subject–professor linkage, which happens lazily on first
/// scheduling rather than at section creation. `schedule_slots` carries the
/// slots already placed for this subject, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRequirement {
    pub subject_id: SubjectId,
    pub subject_code: String,
    pub subject_title: String,
    pub units: u32,
    pub subject_type: SubjectType,
    #[serde(default)]
    pub section_subject_id: Option<SectionSubjectId>,
    #[serde(default)]
    pub schedule_slots: Vec<Slot>,
}

/// Semester metadata attached to a section schedule response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterInfo {
    pub id: SemesterId,
    #[serde(default)]
    pub label: String,
}

/// Full schedule state of one section as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScheduleData {
    pub section_id: SectionId,
    pub semester: SemesterInfo,
    pub subjects: Vec<SubjectRequirement>,
}

/// Result of a single backend conflict check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictCheck {
    pub has_conflict: bool,
    /// Human-readable description of the conflicting commitment, when one
    /// was identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,
}

impl ConflictCheck {
    pub fn clear() -> Self {
        Self {
            has_conflict: false,
            conflict: None,
        }
    }

    pub fn conflicting(detail: impl Into<String>) -> Self {
        Self {
            has_conflict: true,
            conflict: Some(detail.into()),
        }
    }
}

/// Query body for the section-axis conflict check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConflictQuery {
    pub section_id: SectionId,
    pub day: Day,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

/// Query body for the professor-axis conflict check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessorConflictQuery {
    pub professor_id: ProfessorId,
    pub semester_id: SemesterId,
    pub day: Day,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

/// Query body for the room-axis conflict check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConflictQuery {
    pub room: String,
    pub day: Day,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

/// Request body for lazy creation of a section–subject linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSectionSubject {
    pub section: SectionId,
    pub subject: SubjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor: Option<ProfessorId>,
    pub is_tba: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().expect("valid time literal")
    }

    fn slot(day: Day, start: &str, end: &str) -> Slot {
        Slot {
            id: Some(SlotId::new(1)),
            section_subject_id: SectionSubjectId::new(10),
            day,
            start_time: t(start),
            end_time: t(end),
            professor_id: None,
            room: None,
        }
    }

    #[test]
    fn test_id_display_and_value() {
        let id = SectionId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn test_ids_hash_distinct() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(SlotId::new(1));
        set.insert(SlotId::new(2));
        set.insert(SlotId::new(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_teaching_week_order_and_length() {
        assert_eq!(Day::TEACHING_WEEK.len(), 6);
        assert_eq!(Day::TEACHING_WEEK.first(), Some(&Day::Monday));
        assert_eq!(Day::TEACHING_WEEK.last(), Some(&Day::Saturday));
        assert!(!Day::TEACHING_WEEK.contains(&Day::Sunday));
        assert!(Day::ALL.contains(&Day::Sunday));
    }

    #[test]
    fn test_day_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Day::Monday).unwrap(), "\"monday\"");
        let day: Day = serde_json::from_str("\"saturday\"").unwrap();
        assert_eq!(day, Day::Saturday);
    }

    #[test]
    fn test_slot_overlap_same_day() {
        let a = slot(Day::Monday, "08:30", "10:00");
        let b = slot(Day::Monday, "09:00", "09:30");
        let c = slot(Day::Monday, "10:00", "11:00");
        assert!(a.overlaps(&b));
        // Touching boundaries do not intersect.
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_slot_overlap_different_day() {
        let a = slot(Day::Monday, "08:30", "10:00");
        let b = slot(Day::Tuesday, "08:30", "10:00");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_slot_time_span_valid() {
        assert!(slot(Day::Monday, "08:00", "09:00").time_span_valid());
        assert!(!slot(Day::Monday, "09:00", "09:00").time_span_valid());
        assert!(!slot(Day::Monday, "10:00", "09:00").time_span_valid());
    }

    #[test]
    fn test_conflict_check_constructors() {
        assert!(!ConflictCheck::clear().has_conflict);
        let check = ConflictCheck::conflicting("IT205 - BSIT-2A");
        assert!(check.has_conflict);
        assert_eq!(check.conflict.as_deref(), Some("IT205 - BSIT-2A"));
    }

    #[test]
    fn test_slot_wire_roundtrip() {
        let json = r#"{
            "id": 77,
            "section_subject_id": 5,
            "day": "tuesday",
            "start_time": "10:00",
            "end_time": "11:30",
            "professor_id": 3,
            "room": "CL-301"
        }"#;
        let parsed: Slot = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, Some(SlotId::new(77)));
        assert_eq!(parsed.day, Day::Tuesday);
        assert_eq!(parsed.start_time, t("10:00"));
        assert_eq!(parsed.room.as_deref(), Some("CL-301"));

        let back = serde_json::to_string(&parsed).unwrap();
        let reparsed: Slot = serde_json::from_str(&back).unwrap();
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn test_proposed_slot_omits_id() {
        let json = r#"{
            "section_subject_id": 5,
            "day": "monday",
            "start_time": "08:00",
            "end_time": "09:30"
        }"#;
        let parsed: Slot = serde_json::from_str(json).unwrap();
        assert!(!parsed.is_saved());
        assert!(parsed.professor_id.is_none());
        assert!(parsed.room.is_none());
    }
}
