//! Interactive placement state machine.
//!
//! The controller turns the user's two-step action (arm a pending subject,
//! then target a grid cell) or a direct drag-and-drop onto a cell into one
//! create request for a slot, running the conflict checks before anything is
//! committed. Both entry points converge on a single tagged
//! [`PlacementIntent`] feeding one validating transition, so the click and
//! drag paths cannot drift in behavior.
//!
//! Committing is gated: the section check must come back clean, soft
//! warnings must be explicitly confirmed, and a requirement without a
//! materialized section-subject linkage gets one created first. A linkage
//! failure aborts the whole placement so no slot can ever reference a
//! missing linkage. After a confirmed write the registry is reloaded
//! wholesale; the optimistic echo only bridges the gap until that reload
//! resolves.

use std::sync::Arc;

use log::{debug, warn};

use crate::api::{
    Day, NewSectionSubject, ProfessorId, SectionId, SectionSubjectId, Slot, SlotId, SubjectId,
    TimeOfDay,
};
use crate::backend::{BackendError, ScheduleService};
use crate::config::PlacementPolicy;
use crate::engine::conflicts::{self, ConflictWarning, PlacementProbe, PlacementVerdict};
use crate::engine::registry::SlotRegistry;
use crate::engine::tracker::SubjectTracker;

/// Outcome of one placement attempt.
pub type PlacementResult<T> = Result<T, PlacementError>;

/// Why a placement attempt ended without a saved slot.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    /// The section already has a class at the proposed day/time. There is no
    /// override path on this axis.
    #[error("Section conflict: {reason}")]
    SectionConflict { reason: String },

    /// The user declined to place over a professor or room warning.
    #[error("Placement declined after a conflict warning")]
    OverrideDeclined,

    /// The section-subject linkage could not be created; no slot was saved.
    #[error("Could not link the subject to the section: {0}")]
    LinkageCreation(#[source] BackendError),

    /// The targeted slot no longer exists, e.g. removed by another session.
    #[error("Slot no longer exists; reload the schedule: {0}")]
    StaleSlot(#[source] BackendError),

    /// Another submission for this section is already in flight.
    #[error("A placement is already in progress")]
    Busy,

    /// The placement was cancelled while a backend call was in flight; the
    /// call's result was discarded.
    #[error("The placement was cancelled")]
    Cancelled,

    /// Any other backend failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// How the user initiated a placement. Both variants feed the same
/// validating transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementIntent {
    /// A pending subject was armed from the sidebar, then a cell clicked.
    ArmedClick(SubjectId),
    /// A subject was dragged straight onto a cell, bypassing arming.
    DragDrop(SubjectId),
}

impl PlacementIntent {
    pub fn subject_id(&self) -> SubjectId {
        match self {
            PlacementIntent::ArmedClick(id) | PlacementIntent::DragDrop(id) => *id,
        }
    }
}

/// A targeted grid cell plus the bindings chosen for the new slot.
///
/// An `end_time` left `None` is derived from the configured default session
/// length. Professor and room stay TBA unless bound here.
#[derive(Debug, Clone, PartialEq)]
pub struct CellTarget {
    pub day: Day,
    pub start_time: TimeOfDay,
    pub end_time: Option<TimeOfDay>,
    pub professor_id: Option<ProfessorId>,
    pub room: Option<String>,
}

impl CellTarget {
    pub fn new(day: Day, start_time: TimeOfDay) -> Self {
        Self {
            day,
            start_time,
            end_time: None,
            professor_id: None,
            room: None,
        }
    }

    pub fn until(mut self, end_time: TimeOfDay) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_professor(mut self, professor_id: ProfessorId) -> Self {
        self.professor_id = Some(professor_id);
        self
    }

    pub fn in_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    /// No placement in progress.
    Idle,
    /// A pending subject is armed; the next targeted cell places it.
    SubjectArmed { subject_id: SubjectId },
    /// Conflict checks are in flight.
    Validating,
    /// Soft conflicts were reported; waiting on the user's decision.
    AwaitingOverride,
    /// The write and authoritative reload are in flight.
    Committing,
}

/// How a placement attempt that did not error resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    /// The slot was saved and the registry reloaded.
    Committed { slot: Slot },
    /// Soft conflicts need explicit confirmation via
    /// [`PlacementController::resolve_override`].
    NeedsConfirmation { warnings: Vec<ConflictWarning> },
}

/// A validated placement waiting to commit.
#[derive(Debug, Clone)]
struct StagedPlacement {
    subject_id: SubjectId,
    linkage: Option<SectionSubjectId>,
    day: Day,
    start_time: TimeOfDay,
    end_time: TimeOfDay,
    professor_id: Option<ProfessorId>,
    room: Option<String>,
    epoch: u64,
}

/// Orchestrates interactive placement for one section at a time.
///
/// The controller owns the slot registry and subject tracker for the open
/// section and assumes a single editor per section; changes made by a
/// concurrent editor are only discovered on the next full reload.
pub struct PlacementController {
    service: Arc<dyn ScheduleService>,
    policy: PlacementPolicy,
    registry: SlotRegistry,
    tracker: SubjectTracker,
    state: PlacementState,
    staged: Option<StagedPlacement>,
    /// Bumped on every cancellation; backend results carrying an older epoch
    /// are discarded without a state transition.
    epoch: u64,
    /// Blocks re-entrant submission while a write is in flight.
    busy: bool,
}

impl PlacementController {
    pub fn new(service: Arc<dyn ScheduleService>, policy: PlacementPolicy) -> Self {
        Self {
            service,
            policy,
            registry: SlotRegistry::new(),
            tracker: SubjectTracker::new(),
            state: PlacementState::Idle,
            staged: None,
            epoch: 0,
            busy: false,
        }
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &SubjectTracker {
        &self.tracker
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Load a section for editing, cancelling any in-progress placement.
    pub async fn open_section(&mut self, section_id: SectionId) -> Result<(), BackendError> {
        self.cancel();
        let requirements = self.registry.load(self.service.as_ref(), section_id).await?;
        self.tracker
            .set_section(section_id, requirements, self.registry.slots());
        Ok(())
    }

    /// Re-fetch the authoritative schedule for the open section.
    ///
    /// This is the retry affordance after a failed load; the registry keeps
    /// its previous contents until a fetch succeeds.
    pub async fn reload(&mut self) -> Result<(), BackendError> {
        let section_id = self
            .registry
            .section_id()
            .ok_or_else(|| BackendError::validation("No section schedule is loaded"))?;
        let requirements = self.registry.load(self.service.as_ref(), section_id).await?;
        self.tracker
            .set_section(section_id, requirements, self.registry.slots());
        Ok(())
    }

    /// Arm a pending subject for click-to-place.
    pub fn arm_subject(&mut self, subject_id: SubjectId) -> PlacementResult<()> {
        if self.busy || matches!(self.state, PlacementState::AwaitingOverride) {
            return Err(PlacementError::Busy);
        }
        if !self.tracker.select(subject_id) {
            return Err(BackendError::validation(format!(
                "Subject {} is not pending for this section",
                subject_id
            ))
            .into());
        }
        self.state = PlacementState::SubjectArmed { subject_id };
        debug!("Armed subject {} for click-to-place", subject_id);
        Ok(())
    }

    /// Place the armed subject on a grid cell.
    pub async fn target_cell(&mut self, target: CellTarget) -> PlacementResult<PlacementOutcome> {
        let PlacementState::SubjectArmed { subject_id } = self.state else {
            return Err(BackendError::validation("No subject is armed for placement").into());
        };
        self.run_placement(PlacementIntent::ArmedClick(subject_id), target)
            .await
    }

    /// Place a subject dragged directly onto a grid cell.
    ///
    /// Unlike the armed path this accepts already-scheduled subjects, since
    /// a subject can legitimately meet more than once a week.
    pub async fn drop_subject(
        &mut self,
        subject_id: SubjectId,
        target: CellTarget,
    ) -> PlacementResult<PlacementOutcome> {
        if self.busy || matches!(self.state, PlacementState::AwaitingOverride) {
            return Err(PlacementError::Busy);
        }
        self.run_placement(PlacementIntent::DragDrop(subject_id), target)
            .await
    }

    /// Resolve a pending override prompt.
    ///
    /// Confirming commits the staged placement; declining aborts it with no
    /// side effects.
    pub async fn resolve_override(&mut self, confirmed: bool) -> PlacementResult<PlacementOutcome> {
        if self.busy {
            return Err(PlacementError::Busy);
        }
        let Some(staged) = self.staged.take() else {
            return Err(PlacementError::Cancelled);
        };
        if staged.epoch != self.epoch {
            self.state = PlacementState::Idle;
            return Err(PlacementError::Cancelled);
        }
        if !confirmed {
            debug!("Override declined; aborting the placement");
            self.state = PlacementState::Idle;
            return Err(PlacementError::OverrideDeclined);
        }
        self.commit(staged).await
    }

    /// Abort the in-progress placement, if any.
    ///
    /// A backend request already dispatched is allowed to complete; its
    /// result is discarded once it resolves against a newer epoch, with no
    /// further state transition.
    pub fn cancel(&mut self) {
        self.epoch += 1;
        self.staged = None;
        self.busy = false;
        self.tracker.clear_selection();
        self.state = PlacementState::Idle;
    }

    /// Delete a slot and reload.
    ///
    /// Removal is destructive; the owning subject returns to pending when
    /// this was its only slot.
    pub async fn remove_slot(&mut self, slot_id: SlotId) -> PlacementResult<()> {
        if self.busy {
            return Err(PlacementError::Busy);
        }
        self.busy = true;
        let result = self.service.delete_slot(slot_id).await;
        self.busy = false;

        match result {
            Ok(()) => {
                self.registry.apply_removed(slot_id);
                self.tracker.sync(self.registry.slots());
                self.refresh().await;
                Ok(())
            }
            Err(e @ BackendError::NotFound { .. }) => Err(PlacementError::StaleSlot(e)),
            Err(e) => Err(PlacementError::Backend(e)),
        }
    }

    /// The professor's committed slots this semester, for painting busy
    /// cells as an overlay during drag interactions.
    pub async fn professor_overlay(
        &self,
        professor_id: ProfessorId,
    ) -> Result<Vec<Slot>, BackendError> {
        let semester_id = self
            .registry
            .semester()
            .map(|s| s.id)
            .ok_or_else(|| BackendError::validation("No section schedule is loaded"))?;
        self.service
            .fetch_professor_schedule(professor_id, semester_id)
            .await
    }

    async fn run_placement(
        &mut self,
        intent: PlacementIntent,
        target: CellTarget,
    ) -> PlacementResult<PlacementOutcome> {
        if self.busy {
            return Err(PlacementError::Busy);
        }
        let section_id = self
            .registry
            .section_id()
            .ok_or_else(|| BackendError::validation("No section schedule is loaded"))?;
        let semester_id = self
            .registry
            .semester()
            .map(|s| s.id)
            .ok_or_else(|| BackendError::validation("No section schedule is loaded"))?;

        let subject_id = intent.subject_id();
        let linkage = self
            .tracker
            .requirement(subject_id)
            .ok_or_else(|| {
                BackendError::validation(format!(
                    "Subject {} is not part of this section",
                    subject_id
                ))
            })?
            .section_subject_id;

        let end_time = match target.end_time {
            Some(end) => end,
            None => target
                .start_time
                .checked_add_minutes(self.policy.default_session_minutes)
                .ok_or_else(|| {
                    BackendError::validation("Derived end time would run past midnight")
                })?,
        };
        if target.start_time >= end_time {
            return Err(BackendError::validation(format!(
                "Start {} must precede end {}",
                target.start_time, end_time
            ))
            .into());
        }

        self.state = PlacementState::Validating;
        debug!(
            "Validating {:?} at {} {}-{}",
            intent, target.day, target.start_time, end_time
        );

        let probe = PlacementProbe {
            section_id,
            semester_id,
            day: target.day,
            start_time: target.start_time,
            end_time,
            professor_id: target.professor_id,
            room: target.room.clone(),
        };
        let epoch = self.epoch;
        let verdict = conflicts::evaluate(self.service.as_ref(), &probe).await;
        if epoch != self.epoch {
            debug!("Discarding conflict verdict for a cancelled placement");
            return Err(PlacementError::Cancelled);
        }

        let staged = StagedPlacement {
            subject_id,
            linkage,
            day: target.day,
            start_time: target.start_time,
            end_time,
            professor_id: target.professor_id,
            room: target.room,
            epoch,
        };

        match verdict {
            PlacementVerdict::Rejected { reason } => {
                debug!("Placement rejected on the section axis: {}", reason);
                self.state = PlacementState::Idle;
                Err(PlacementError::SectionConflict { reason })
            }
            PlacementVerdict::NeedsConfirmation { warnings } => {
                self.staged = Some(staged);
                self.state = PlacementState::AwaitingOverride;
                Ok(PlacementOutcome::NeedsConfirmation { warnings })
            }
            PlacementVerdict::Clear => self.commit(staged).await,
        }
    }

    async fn commit(&mut self, staged: StagedPlacement) -> PlacementResult<PlacementOutcome> {
        self.state = PlacementState::Committing;
        self.busy = true;
        let result = self.commit_inner(staged).await;
        self.busy = false;
        self.state = PlacementState::Idle;
        result
    }

    async fn commit_inner(&mut self, staged: StagedPlacement) -> PlacementResult<PlacementOutcome> {
        let section_id = self
            .registry
            .section_id()
            .ok_or_else(|| BackendError::validation("No section schedule is loaded"))?;

        // Materialize the section-subject linkage before the slot can exist.
        let linkage = match staged.linkage {
            Some(id) => id,
            None => {
                let request = NewSectionSubject {
                    section: section_id,
                    subject: staged.subject_id,
                    professor: staged.professor_id,
                    is_tba: staged.professor_id.is_none(),
                };
                self.service
                    .create_section_subject(request)
                    .await
                    .map_err(PlacementError::LinkageCreation)?
            }
        };
        if staged.epoch != self.epoch {
            debug!("Discarding linkage result for a cancelled placement");
            return Err(PlacementError::Cancelled);
        }

        let proposed = Slot {
            id: None,
            section_subject_id: linkage,
            day: staged.day,
            start_time: staged.start_time,
            end_time: staged.end_time,
            professor_id: staged.professor_id,
            room: staged.room,
        };
        let saved = self.service.save_slot(proposed).await.map_err(|e| match e {
            BackendError::NotFound { .. } => PlacementError::StaleSlot(e),
            other => PlacementError::Backend(other),
        })?;
        if staged.epoch != self.epoch {
            warn!(
                "Slot {:?} was saved for a cancelled placement; it will appear on the next reload",
                saved.id
            );
            return Err(PlacementError::Cancelled);
        }

        self.registry.apply_saved(saved.clone());
        self.tracker.sync(self.registry.slots());
        self.refresh().await;
        Ok(PlacementOutcome::Committed { slot: saved })
    }

    /// Reconcile by replacing state wholesale from the backend.
    ///
    /// The write already succeeded, so a failed reload keeps the optimistic
    /// echo rather than failing the placement; the next reload catches up.
    async fn refresh(&mut self) {
        if let Err(e) = self.reload().await {
            warn!("Authoritative reload after a confirmed write failed: {}", e);
        }
    }
}
