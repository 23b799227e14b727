#![allow(dead_code)]

use std::sync::Arc;

use aims_sched::api::{
    Day, ProfessorId, SectionId, SectionSubjectId, SemesterId, SemesterInfo, Slot, SubjectId,
    SubjectRequirement, SubjectType, TimeOfDay,
};
use aims_sched::backend::LocalScheduleService;
use aims_sched::config::PlacementPolicy;
use aims_sched::engine::PlacementController;

pub fn t(s: &str) -> TimeOfDay {
    s.parse().expect("valid time literal")
}

pub fn semester() -> SemesterInfo {
    SemesterInfo {
        id: SemesterId::new(1),
        label: "1st Semester AY 2025-2026".to_string(),
    }
}

pub fn requirement(subject_id: i64, code: &str, linkage: Option<i64>) -> SubjectRequirement {
    SubjectRequirement {
        subject_id: SubjectId::new(subject_id),
        subject_code: code.to_string(),
        subject_title: format!("{} title", code),
        units: 3,
        subject_type: SubjectType::Lecture,
        section_subject_id: linkage.map(SectionSubjectId::new),
        schedule_slots: Vec::new(),
    }
}

pub fn proposed_slot(linkage: i64, day: Day, start: &str, end: &str) -> Slot {
    Slot {
        id: None,
        section_subject_id: SectionSubjectId::new(linkage),
        day,
        start_time: t(start),
        end_time: t(end),
        professor_id: None,
        room: None,
    }
}

pub fn taught_slot(
    linkage: i64,
    day: Day,
    start: &str,
    end: &str,
    professor: i64,
) -> Slot {
    Slot {
        professor_id: Some(ProfessorId::new(professor)),
        ..proposed_slot(linkage, day, start, end)
    }
}

/// A service holding section 12 ("BSIT-1A") with IT101 linked as 501 and
/// IT102 still unlinked.
pub fn seeded_service() -> Arc<LocalScheduleService> {
    let service = Arc::new(LocalScheduleService::new());
    service.seed_section(
        SectionId::new(12),
        "BSIT-1A",
        semester(),
        vec![
            requirement(101, "IT101", Some(501)),
            requirement(102, "IT102", None),
        ],
    );
    service
}

/// Adds section 13 ("BSIT-2A") with IT205 linked as 601.
pub fn seed_other_section(service: &LocalScheduleService) {
    service.seed_section(
        SectionId::new(13),
        "BSIT-2A",
        semester(),
        vec![requirement(205, "IT205", Some(601))],
    );
}

pub async fn open_controller(
    service: &Arc<LocalScheduleService>,
    section_id: i64,
) -> PlacementController {
    let mut controller =
        PlacementController::new(service.clone(), PlacementPolicy::default());
    controller
        .open_section(SectionId::new(section_id))
        .await
        .expect("section should load");
    controller
}
