//! Slot registry for the section being edited.
//!
//! The registry is the sole in-memory owner of the slots of one section. It
//! is refreshed wholesale from the backend; it is never partially patched
//! from a failed operation, so a failed refresh leaves the previous contents
//! intact. The `apply_*` methods are optimistic echoes applied only after a
//! confirmed backend write, so a UI can render immediately while the
//! authoritative reload is still in flight.

use log::warn;

use crate::api::{
    Day, ProfessorId, SectionId, SemesterInfo, Slot, SlotId, SubjectRequirement, TimeOfDay,
};
use crate::backend::{BackendResult, ScheduleService};

/// In-memory slot set for one section.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    section_id: Option<SectionId>,
    semester: Option<SemesterInfo>,
    slots: Vec<Slot>,
}

/// Partial update applied to a registry entry after a confirmed backend
/// write. Fields left `None` are unchanged.
#[derive(Debug, Clone, Default)]
pub struct SlotPatch {
    pub day: Option<Day>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub professor_id: Option<ProfessorId>,
    pub room: Option<String>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section whose slots are currently held, if any.
    pub fn section_id(&self) -> Option<SectionId> {
        self.section_id
    }

    /// Semester metadata of the loaded section.
    pub fn semester(&self) -> Option<&SemesterInfo> {
        self.semester.as_ref()
    }

    /// The current slot set.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Look up a slot by id.
    pub fn slot(&self, slot_id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == Some(slot_id))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Replace the entire slot set from the backend.
    ///
    /// All-or-nothing: on failure the previous contents are kept untouched
    /// and the error is returned for the caller to surface. Returns the
    /// section's subject requirements for the unplaced tracker.
    pub async fn load(
        &mut self,
        service: &dyn ScheduleService,
        section_id: SectionId,
    ) -> BackendResult<Vec<SubjectRequirement>> {
        let data = service.fetch_section_schedule(section_id).await?;

        let mut slots = Vec::new();
        for subject in &data.subjects {
            for slot in &subject.schedule_slots {
                if slot.id.is_none() {
                    warn!(
                        "Discarding unsaved slot for subject {} in section {} payload",
                        subject.subject_code, section_id
                    );
                    continue;
                }
                slots.push(slot.clone());
            }
        }

        self.section_id = Some(section_id);
        self.semester = Some(data.semester.clone());
        self.slots = slots;
        Ok(data.subjects)
    }

    /// Discard all held slots.
    pub fn clear(&mut self) {
        self.section_id = None;
        self.semester = None;
        self.slots.clear();
    }

    /// Echo a confirmed create/update.
    ///
    /// Proposed (id-less) slots are never stored; an echo for an id already
    /// present replaces that entry so the set never holds duplicate ids.
    pub fn apply_saved(&mut self, slot: Slot) {
        let Some(id) = slot.id else {
            warn!("Ignoring echo of unsaved slot; registry only holds saved slots");
            return;
        };
        match self.slots.iter_mut().find(|s| s.id == Some(id)) {
            Some(existing) => *existing = slot,
            None => self.slots.push(slot),
        }
    }

    /// Echo a confirmed partial update.
    pub fn apply_update(&mut self, slot_id: SlotId, patch: SlotPatch) {
        let Some(slot) = self.slots.iter_mut().find(|s| s.id == Some(slot_id)) else {
            warn!("Ignoring update echo for unknown slot {}", slot_id);
            return;
        };
        if let Some(day) = patch.day {
            slot.day = day;
        }
        if let Some(start_time) = patch.start_time {
            slot.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            slot.end_time = end_time;
        }
        if let Some(professor_id) = patch.professor_id {
            slot.professor_id = Some(professor_id);
        }
        if let Some(room) = patch.room {
            slot.room = Some(room);
        }
    }

    /// Echo a confirmed removal.
    pub fn apply_removed(&mut self, slot_id: SlotId) {
        self.slots.retain(|slot| slot.id != Some(slot_id));
    }
}
