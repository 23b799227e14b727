//! Conflict checking for a proposed placement.
//!
//! Three independent axes, each answered by the backend: the section itself
//! (hard block), the candidate professor, and the candidate room (both soft
//! warnings the user may override). The section check is issued and resolved
//! first; a section hit short-circuits the soft axes entirely.
//!
//! A transport failure is an unknown answer, not a clean one. On the hard
//! axis unknown degrades to a rejection; on the soft axes it degrades to a
//! warning the user decides on, since blocking all scheduling on a network
//! blip is worse than a rare missed warning.

use log::warn;

use crate::api::{
    Day, ProfessorConflictQuery, ProfessorId, RoomConflictQuery, SectionConflictQuery, SectionId,
    SemesterId, TimeOfDay,
};
use crate::backend::ScheduleService;

/// A proposed day/time placement with its conflict-relevant bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementProbe {
    pub section_id: SectionId,
    pub semester_id: SemesterId,
    pub day: Day,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub professor_id: Option<ProfessorId>,
    pub room: Option<String>,
}

/// Conflict dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAxis {
    Section,
    Professor,
    Room,
}

impl std::fmt::Display for ConflictAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConflictAxis::Section => "section",
            ConflictAxis::Professor => "professor",
            ConflictAxis::Room => "room",
        };
        write!(f, "{}", name)
    }
}

/// A soft conflict the user must explicitly acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictWarning {
    pub axis: ConflictAxis,
    /// The identified conflicting commitment, when the backend named one.
    /// `None` means the axis could not be verified and is unknown.
    pub detail: Option<String>,
}

/// Outcome of evaluating a placement across all applicable axes.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementVerdict {
    /// No conflicts; the placement may commit immediately.
    Clear,
    /// Soft conflicts found; commit only after explicit confirmation.
    NeedsConfirmation { warnings: Vec<ConflictWarning> },
    /// Hard section conflict; the placement is rejected outright.
    Rejected { reason: String },
}

/// Evaluate a placement probe against the backend.
///
/// The section axis resolves first and a hit (or an unverifiable answer)
/// rejects without touching the soft axes. The room axis is skipped when the
/// probe carries no room, since an unset room cannot conflict.
pub async fn evaluate(
    service: &dyn ScheduleService,
    probe: &PlacementProbe,
) -> PlacementVerdict {
    match service
        .check_section_conflict(SectionConflictQuery {
            section_id: probe.section_id,
            day: probe.day,
            start_time: probe.start_time,
            end_time: probe.end_time,
        })
        .await
    {
        Ok(check) if check.has_conflict => {
            return PlacementVerdict::Rejected {
                reason: check
                    .conflict
                    .unwrap_or_else(|| "The section already has a class at this time".to_string()),
            };
        }
        Ok(_) => {}
        Err(e) => {
            warn!("Section conflict check failed, rejecting conservatively: {}", e);
            return PlacementVerdict::Rejected {
                reason: "Section availability could not be verified".to_string(),
            };
        }
    }

    let mut warnings = Vec::new();

    if let Some(professor_id) = probe.professor_id {
        match service
            .check_professor_conflict(ProfessorConflictQuery {
                professor_id,
                semester_id: probe.semester_id,
                day: probe.day,
                start_time: probe.start_time,
                end_time: probe.end_time,
            })
            .await
        {
            Ok(check) if check.has_conflict => warnings.push(ConflictWarning {
                axis: ConflictAxis::Professor,
                detail: check.conflict,
            }),
            Ok(_) => {}
            Err(e) => {
                warn!("Professor conflict check failed, degrading to a warning: {}", e);
                warnings.push(ConflictWarning {
                    axis: ConflictAxis::Professor,
                    detail: None,
                });
            }
        }
    }

    match probe.room.as_deref() {
        Some(room) if !room.is_empty() => {
            match service
                .check_room_conflict(RoomConflictQuery {
                    room: room.to_string(),
                    day: probe.day,
                    start_time: probe.start_time,
                    end_time: probe.end_time,
                })
                .await
            {
                Ok(check) if check.has_conflict => warnings.push(ConflictWarning {
                    axis: ConflictAxis::Room,
                    detail: check.conflict,
                }),
                Ok(_) => {}
                Err(e) => {
                    warn!("Room conflict check failed, degrading to a warning: {}", e);
                    warnings.push(ConflictWarning {
                        axis: ConflictAxis::Room,
                        detail: None,
                    });
                }
            }
        }
        // TBA rooms cannot conflict.
        _ => {}
    }

    if warnings.is_empty() {
        PlacementVerdict::Clear
    } else {
        PlacementVerdict::NeedsConfirmation { warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::*;
    use crate::backend::LocalScheduleService;

    fn t(s: &str) -> TimeOfDay {
        s.parse().expect("valid time literal")
    }

    fn requirement(subject_id: i64, code: &str, linkage: i64) -> SubjectRequirement {
        SubjectRequirement {
            subject_id: SubjectId::new(subject_id),
            subject_code: code.to_string(),
            subject_title: format!("{} title", code),
            units: 3,
            subject_type: SubjectType::Lecture,
            section_subject_id: Some(SectionSubjectId::new(linkage)),
            schedule_slots: Vec::new(),
        }
    }

    fn semester() -> SemesterInfo {
        SemesterInfo {
            id: SemesterId::new(1),
            label: "1st Semester".to_string(),
        }
    }

    fn probe(day: Day, start: &str, end: &str) -> PlacementProbe {
        PlacementProbe {
            section_id: SectionId::new(12),
            semester_id: SemesterId::new(1),
            day,
            start_time: t(start),
            end_time: t(end),
            professor_id: None,
            room: None,
        }
    }

    fn service_with_section_slot() -> LocalScheduleService {
        let service = LocalScheduleService::new();
        service.seed_section(
            SectionId::new(12),
            "BSIT-1A",
            semester(),
            vec![requirement(101, "IT101", 501)],
        );
        service.seed_slot(Slot {
            id: None,
            section_subject_id: SectionSubjectId::new(501),
            day: Day::Monday,
            start_time: t("08:30"),
            end_time: t("10:00"),
            professor_id: Some(ProfessorId::new(7)),
            room: Some("CL-301".to_string()),
        });
        service
    }

    #[tokio::test]
    async fn test_clear_when_nothing_collides() {
        let service = service_with_section_slot();
        let verdict = evaluate(&service, &probe(Day::Tuesday, "10:00", "11:30")).await;
        assert_eq!(verdict, PlacementVerdict::Clear);
    }

    #[tokio::test]
    async fn test_section_conflict_rejects() {
        let service = service_with_section_slot();
        let verdict = evaluate(&service, &probe(Day::Monday, "09:00", "10:30")).await;
        assert!(matches!(verdict, PlacementVerdict::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_section_rejection_suppresses_soft_warnings() {
        let service = service_with_section_slot();
        let mut contested = probe(Day::Monday, "09:00", "10:30");
        contested.professor_id = Some(ProfessorId::new(7));
        contested.room = Some("CL-301".to_string());

        let verdict = evaluate(&service, &contested).await;
        match verdict {
            PlacementVerdict::Rejected { reason } => {
                assert!(reason.contains("IT101"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_professor_conflict_warns() {
        let service = service_with_section_slot();
        // Different section, same professor, overlapping time.
        service.seed_section(
            SectionId::new(13),
            "BSIT-2A",
            semester(),
            vec![requirement(205, "IT205", 601)],
        );
        let mut contested = PlacementProbe {
            section_id: SectionId::new(13),
            ..probe(Day::Monday, "09:00", "10:30")
        };
        contested.professor_id = Some(ProfessorId::new(7));

        let verdict = evaluate(&service, &contested).await;
        match verdict {
            PlacementVerdict::NeedsConfirmation { warnings } => {
                assert_eq!(warnings.len(), 1);
                assert_eq!(warnings[0].axis, ConflictAxis::Professor);
                assert_eq!(warnings[0].detail.as_deref(), Some("IT101 - BSIT-1A"));
            }
            other => panic!("expected confirmation request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tba_room_skips_room_check() {
        let service = service_with_section_slot();
        service.seed_section(
            SectionId::new(13),
            "BSIT-2A",
            semester(),
            vec![requirement(205, "IT205", 601)],
        );
        // Same time as the occupied CL-301 slot, but no room bound.
        let contested = PlacementProbe {
            section_id: SectionId::new(13),
            ..probe(Day::Monday, "09:00", "10:30")
        };

        let verdict = evaluate(&service, &contested).await;
        assert_eq!(verdict, PlacementVerdict::Clear);
    }

    #[tokio::test]
    async fn test_transport_failure_rejects_hard_axis() {
        let service = service_with_section_slot();
        service.set_healthy(false);

        let verdict = evaluate(&service, &probe(Day::Tuesday, "10:00", "11:30")).await;
        assert!(matches!(verdict, PlacementVerdict::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_professor_check_failure_degrades_to_unverified_warning() {
        let service = service_with_section_slot();
        service.fail_operation("check_professor_conflict");

        let mut contested = probe(Day::Tuesday, "10:00", "11:30");
        contested.professor_id = Some(ProfessorId::new(7));

        let verdict = evaluate(&service, &contested).await;
        match verdict {
            PlacementVerdict::NeedsConfirmation { warnings } => {
                assert_eq!(warnings.len(), 1);
                assert_eq!(warnings[0].axis, ConflictAxis::Professor);
                assert!(warnings[0].detail.is_none(), "axis is unknown, not identified");
            }
            other => panic!("expected confirmation request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_room_check_failure_degrades_to_unverified_warning() {
        let service = service_with_section_slot();
        service.fail_operation("check_room_conflict");

        let mut contested = probe(Day::Tuesday, "10:00", "11:30");
        contested.room = Some("CL-305".to_string());

        let verdict = evaluate(&service, &contested).await;
        match verdict {
            PlacementVerdict::NeedsConfirmation { warnings } => {
                assert_eq!(warnings.len(), 1);
                assert_eq!(warnings[0].axis, ConflictAxis::Room);
                assert!(warnings[0].detail.is_none());
            }
            other => panic!("expected confirmation request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_room_string_skips_room_check() {
        let service = service_with_section_slot();
        service.seed_section(
            SectionId::new(13),
            "BSIT-2A",
            semester(),
            vec![requirement(205, "IT205", 601)],
        );
        let mut contested = PlacementProbe {
            section_id: SectionId::new(13),
            ..probe(Day::Monday, "09:00", "10:30")
        };
        contested.room = Some(String::new());

        let verdict = evaluate(&service, &contested).await;
        assert_eq!(verdict, PlacementVerdict::Clear);
    }
}
