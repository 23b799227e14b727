//! In-memory local schedule service implementation.
//!
//! This module provides a local implementation of [`ScheduleService`]
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic, and
//! isolated execution. The three conflict checks answer with real overlap
//! arithmetic over the stored slots, and a health toggle lets tests drive
//! the transport-failure degradation paths.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{BackendResult, ErrorContext};
use super::{BackendError, ScheduleService};
use crate::api::*;

/// In-memory local schedule service.
#[derive(Clone)]
pub struct LocalScheduleService {
    data: Arc<RwLock<LocalData>>,
}

impl Default for LocalScheduleService {
    fn default() -> Self {
        Self::new()
    }
}

struct SectionRecord {
    label: String,
    semester: SemesterInfo,
    subjects: Vec<SubjectRequirement>,
}

struct Linkage {
    section: SectionId,
    subject: SubjectId,
}

#[derive(Default)]
struct LocalData {
    sections: HashMap<SectionId, SectionRecord>,
    slots: HashMap<SlotId, Slot>,
    linkages: HashMap<SectionSubjectId, Linkage>,
    next_slot_id: i64,
    next_section_subject_id: i64,
    is_healthy: bool,
    failing_operations: HashSet<String>,
}

impl LocalData {
    fn new() -> Self {
        Self {
            next_slot_id: 1,
            next_section_subject_id: 1,
            is_healthy: true,
            ..Default::default()
        }
    }

    fn guard_healthy(&self, operation: &str) -> BackendResult<()> {
        if !self.is_healthy || self.failing_operations.contains(operation) {
            return Err(BackendError::network_with_context(
                "Backend unreachable",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }

    fn subject_code(&self, linkage_id: SectionSubjectId) -> String {
        self.linkages
            .get(&linkage_id)
            .and_then(|linkage| {
                self.sections.get(&linkage.section).and_then(|section| {
                    section
                        .subjects
                        .iter()
                        .find(|s| s.subject_id == linkage.subject)
                        .map(|s| s.subject_code.clone())
                })
            })
            .unwrap_or_else(|| "?".to_string())
    }

    fn section_label(&self, linkage_id: SectionSubjectId) -> String {
        self.linkages
            .get(&linkage_id)
            .and_then(|linkage| self.sections.get(&linkage.section))
            .map(|section| section.label.clone())
            .unwrap_or_else(|| "?".to_string())
    }

    fn section_of_slot(&self, slot: &Slot) -> Option<SectionId> {
        self.linkages
            .get(&slot.section_subject_id)
            .map(|linkage| linkage.section)
    }

    fn semester_of_slot(&self, slot: &Slot) -> Option<SemesterId> {
        self.section_of_slot(slot)
            .and_then(|section_id| self.sections.get(&section_id))
            .map(|section| section.semester.id)
    }

    fn sorted_slots(&self) -> Vec<&Slot> {
        let mut slots: Vec<&Slot> = self.slots.values().collect();
        slots.sort_by_key(|slot| (slot.day, slot.start_time, slot.id));
        slots
    }
}

impl LocalScheduleService {
    /// Create a new empty local service.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::new())),
        }
    }

    /// Register a section with its subject requirements.
    ///
    /// This is a helper method for setting up data. Linkage ids already
    /// present on the requirements are registered as existing linkages.
    pub fn seed_section(
        &self,
        section_id: SectionId,
        label: impl Into<String>,
        semester: SemesterInfo,
        subjects: Vec<SubjectRequirement>,
    ) {
        let mut data = self.data.write();
        for subject in &subjects {
            if let Some(linkage_id) = subject.section_subject_id {
                data.linkages.insert(
                    linkage_id,
                    Linkage {
                        section: section_id,
                        subject: subject.subject_id,
                    },
                );
                data.next_section_subject_id =
                    data.next_section_subject_id.max(linkage_id.value() + 1);
            }
        }
        data.sections.insert(
            section_id,
            SectionRecord {
                label: label.into(),
                semester,
                subjects,
            },
        );
    }

    /// Store a slot directly, assigning it an id.
    ///
    /// The slot must reference a linkage registered via [`seed_section`] or
    /// [`create_section_subject`].
    ///
    /// [`seed_section`]: LocalScheduleService::seed_section
    /// [`create_section_subject`]: ScheduleService::create_section_subject
    pub fn seed_slot(&self, mut slot: Slot) -> SlotId {
        let mut data = self.data.write();
        assert!(
            data.linkages.contains_key(&slot.section_subject_id),
            "seed_slot requires a registered section-subject linkage"
        );
        let id = SlotId::new(data.next_slot_id);
        data.next_slot_id += 1;
        slot.id = Some(id);
        data.slots.insert(id, slot);
        id
    }

    /// Set the health status for testing transport failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Make a single operation fail with a network error while the rest of
    /// the service stays healthy.
    pub fn fail_operation(&self, operation: impl Into<String>) {
        self.data.write().failing_operations.insert(operation.into());
    }

    /// Clear any per-operation failures installed via [`fail_operation`].
    ///
    /// [`fail_operation`]: LocalScheduleService::fail_operation
    pub fn restore_operations(&self) {
        self.data.write().failing_operations.clear();
    }

    /// Number of slots stored.
    pub fn slot_count(&self) -> usize {
        self.data.read().slots.len()
    }

    /// Check whether a slot exists.
    pub fn has_slot(&self, slot_id: SlotId) -> bool {
        self.data.read().slots.contains_key(&slot_id)
    }

    /// Remove a slot out-of-band, simulating another editing session.
    pub fn drop_slot(&self, slot_id: SlotId) {
        self.data.write().slots.remove(&slot_id);
    }

    /// Clear all data.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let healthy = data.is_healthy;
        *data = LocalData::new();
        data.is_healthy = healthy;
    }
}

#[async_trait]
impl ScheduleService for LocalScheduleService {
    async fn fetch_section_schedule(
        &self,
        section_id: SectionId,
    ) -> BackendResult<SectionScheduleData> {
        let data = self.data.read();
        data.guard_healthy("fetch_section_schedule")?;

        let record = data.sections.get(&section_id).ok_or_else(|| {
            BackendError::not_found_with_context(
                format!("Section {} not found", section_id),
                ErrorContext::new("fetch_section_schedule")
                    .with_entity("section")
                    .with_entity_id(section_id),
            )
        })?;

        let mut subjects = record.subjects.clone();
        for subject in &mut subjects {
            subject.schedule_slots = match subject.section_subject_id {
                Some(linkage_id) => data
                    .sorted_slots()
                    .into_iter()
                    .filter(|slot| slot.section_subject_id == linkage_id)
                    .cloned()
                    .collect(),
                None => Vec::new(),
            };
        }

        Ok(SectionScheduleData {
            section_id,
            semester: record.semester.clone(),
            subjects,
        })
    }

    async fn save_slot(&self, mut slot: Slot) -> BackendResult<Slot> {
        let mut data = self.data.write();
        data.guard_healthy("save_slot")?;

        if !slot.time_span_valid() {
            return Err(BackendError::validation(format!(
                "Slot start {} must precede end {}",
                slot.start_time, slot.end_time
            )));
        }
        if !data.linkages.contains_key(&slot.section_subject_id) {
            return Err(BackendError::validation(format!(
                "Unknown section-subject linkage {}",
                slot.section_subject_id
            )));
        }

        match slot.id {
            Some(id) => {
                if !data.slots.contains_key(&id) {
                    return Err(BackendError::not_found_with_context(
                        format!("Slot {} no longer exists", id),
                        ErrorContext::new("save_slot")
                            .with_entity("slot")
                            .with_entity_id(id),
                    ));
                }
                data.slots.insert(id, slot.clone());
            }
            None => {
                let id = SlotId::new(data.next_slot_id);
                data.next_slot_id += 1;
                slot.id = Some(id);
                data.slots.insert(id, slot.clone());
            }
        }

        Ok(slot)
    }

    async fn delete_slot(&self, slot_id: SlotId) -> BackendResult<()> {
        let mut data = self.data.write();
        data.guard_healthy("delete_slot")?;

        data.slots.remove(&slot_id).ok_or_else(|| {
            BackendError::not_found_with_context(
                format!("Slot {} not found", slot_id),
                ErrorContext::new("delete_slot")
                    .with_entity("slot")
                    .with_entity_id(slot_id),
            )
        })?;
        Ok(())
    }

    async fn check_section_conflict(
        &self,
        query: SectionConflictQuery,
    ) -> BackendResult<ConflictCheck> {
        let data = self.data.read();
        data.guard_healthy("check_section_conflict")?;

        for slot in data.sorted_slots() {
            if data.section_of_slot(slot) != Some(query.section_id) {
                continue;
            }
            if slot.overlaps_window(query.day, query.start_time, query.end_time) {
                let code = data.subject_code(slot.section_subject_id);
                return Ok(ConflictCheck::conflicting(format!(
                    "{} {} {}-{}",
                    code,
                    slot.day.short_label(),
                    slot.start_time,
                    slot.end_time
                )));
            }
        }
        Ok(ConflictCheck::clear())
    }

    async fn check_professor_conflict(
        &self,
        query: ProfessorConflictQuery,
    ) -> BackendResult<ConflictCheck> {
        let data = self.data.read();
        data.guard_healthy("check_professor_conflict")?;

        for slot in data.sorted_slots() {
            if slot.professor_id != Some(query.professor_id) {
                continue;
            }
            if data.semester_of_slot(slot) != Some(query.semester_id) {
                continue;
            }
            if slot.overlaps_window(query.day, query.start_time, query.end_time) {
                let code = data.subject_code(slot.section_subject_id);
                let section = data.section_label(slot.section_subject_id);
                return Ok(ConflictCheck::conflicting(format!("{} - {}", code, section)));
            }
        }
        Ok(ConflictCheck::clear())
    }

    async fn check_room_conflict(
        &self,
        query: RoomConflictQuery,
    ) -> BackendResult<ConflictCheck> {
        let data = self.data.read();
        data.guard_healthy("check_room_conflict")?;

        for slot in data.sorted_slots() {
            if slot.room.as_deref() != Some(query.room.as_str()) {
                continue;
            }
            if slot.overlaps_window(query.day, query.start_time, query.end_time) {
                let code = data.subject_code(slot.section_subject_id);
                let section = data.section_label(slot.section_subject_id);
                return Ok(ConflictCheck::conflicting(format!("{} - {}", code, section)));
            }
        }
        Ok(ConflictCheck::clear())
    }

    async fn create_section_subject(
        &self,
        request: NewSectionSubject,
    ) -> BackendResult<SectionSubjectId> {
        let mut data = self.data.write();
        data.guard_healthy("create_section_subject")?;

        if !data.sections.contains_key(&request.section) {
            return Err(BackendError::not_found_with_context(
                format!("Section {} not found", request.section),
                ErrorContext::new("create_section_subject")
                    .with_entity("section")
                    .with_entity_id(request.section),
            ));
        }

        let id = SectionSubjectId::new(data.next_section_subject_id);
        data.next_section_subject_id += 1;
        data.linkages.insert(
            id,
            Linkage {
                section: request.section,
                subject: request.subject,
            },
        );

        if let Some(record) = data.sections.get_mut(&request.section) {
            if let Some(subject) = record
                .subjects
                .iter_mut()
                .find(|s| s.subject_id == request.subject)
            {
                subject.section_subject_id = Some(id);
            }
        }

        Ok(id)
    }

    async fn fetch_professor_schedule(
        &self,
        professor_id: ProfessorId,
        semester_id: SemesterId,
    ) -> BackendResult<Vec<Slot>> {
        let data = self.data.read();
        data.guard_healthy("fetch_professor_schedule")?;

        Ok(data
            .sorted_slots()
            .into_iter()
            .filter(|slot| slot.professor_id == Some(professor_id))
            .filter(|slot| data.semester_of_slot(slot) == Some(semester_id))
            .cloned()
            .collect())
    }
}
