//! Pending/scheduled partition of a section's subject requirements.
//!
//! A requirement is "scheduled" once at least one slot references its
//! section-subject linkage; everything else is "pending" and shows up in the
//! sidebar list the user picks from. The partition is derived state,
//! recomputed whenever the slot registry changes. Selection of a pending
//! subject for click-to-place is local UI state, never persisted.

use crate::api::{SectionId, Slot, SubjectId, SubjectRequirement};

/// The two derived views over a section's requirements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectBuckets {
    pub pending: Vec<SubjectRequirement>,
    pub scheduled: Vec<SubjectRequirement>,
}

/// Partition requirements by whether any slot references their linkage.
///
/// A requirement without a materialized linkage cannot have slots and is
/// always pending.
pub fn partition(requirements: &[SubjectRequirement], slots: &[Slot]) -> SubjectBuckets {
    let mut buckets = SubjectBuckets::default();
    for requirement in requirements {
        let placed = requirement.section_subject_id.map_or(false, |linkage_id| {
            slots.iter().any(|slot| slot.section_subject_id == linkage_id)
        });
        if placed {
            buckets.scheduled.push(requirement.clone());
        } else {
            buckets.pending.push(requirement.clone());
        }
    }
    buckets
}

/// Tracks a section's requirement list, the derived partition, and the
/// locally-selected ("armed") pending subject.
#[derive(Debug, Default)]
pub struct SubjectTracker {
    section_id: Option<SectionId>,
    requirements: Vec<SubjectRequirement>,
    buckets: SubjectBuckets,
    selected: Option<SubjectId>,
}

impl SubjectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the requirement list for a section.
    ///
    /// Switching to a different section clears the selection.
    pub fn set_section(
        &mut self,
        section_id: SectionId,
        requirements: Vec<SubjectRequirement>,
        slots: &[Slot],
    ) {
        if self.section_id != Some(section_id) {
            self.selected = None;
        }
        self.section_id = Some(section_id);
        self.requirements = requirements;
        self.recompute(slots);
    }

    /// Recompute the partition after a registry change.
    ///
    /// Clears the selection when the selected requirement has become
    /// scheduled.
    pub fn sync(&mut self, slots: &[Slot]) {
        self.recompute(slots);
    }

    fn recompute(&mut self, slots: &[Slot]) {
        self.buckets = partition(&self.requirements, slots);
        if let Some(selected) = self.selected {
            let still_pending = self
                .buckets
                .pending
                .iter()
                .any(|r| r.subject_id == selected);
            if !still_pending {
                self.selected = None;
            }
        }
    }

    pub fn pending(&self) -> &[SubjectRequirement] {
        &self.buckets.pending
    }

    pub fn scheduled(&self) -> &[SubjectRequirement] {
        &self.buckets.scheduled
    }

    /// Look up a requirement by subject id.
    pub fn requirement(&self, subject_id: SubjectId) -> Option<&SubjectRequirement> {
        self.requirements
            .iter()
            .find(|r| r.subject_id == subject_id)
    }

    /// Arm a pending subject for click-to-place.
    ///
    /// Returns false (and leaves the selection unchanged) when the subject
    /// is not currently pending.
    pub fn select(&mut self, subject_id: SubjectId) -> bool {
        let pending = self
            .buckets
            .pending
            .iter()
            .any(|r| r.subject_id == subject_id);
        if pending {
            self.selected = Some(subject_id);
        }
        pending
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The currently armed requirement, if any.
    pub fn selected(&self) -> Option<&SubjectRequirement> {
        self.selected.and_then(|id| self.requirement(id))
    }
}
