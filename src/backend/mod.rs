//! Backend access for the scheduling engine.
//!
//! The remote management backend owns the authoritative schedule state and
//! all conflict arithmetic; the engine reaches it exclusively through the
//! [`ScheduleService`] trait. Implementations:
//!
//! - `local`: in-memory implementation for unit testing and local development
//! - `rest`: REST-over-HTTPS client (feature `rest-backend`)

#[cfg(not(any(feature = "local-backend", feature = "rest-backend")))]
compile_error!("Enable at least one backend feature.");

pub mod error;
#[cfg(feature = "local-backend")]
pub mod local;
#[cfg(feature = "rest-backend")]
pub mod rest;

pub use error::{BackendError, BackendResult, ErrorContext};
#[cfg(feature = "local-backend")]
pub use local::LocalScheduleService;
#[cfg(feature = "rest-backend")]
pub use rest::RestScheduleService;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{
    ConflictCheck, NewSectionSubject, ProfessorConflictQuery, ProfessorId, RoomConflictQuery,
    SectionConflictQuery, SectionId, SectionScheduleData, SectionSubjectId, SemesterId, Slot,
    SlotId,
};
use crate::config::EngineConfig;

/// Remote schedule service consumed by the engine.
///
/// Each method is one backend round trip. The backend is the source of truth
/// for every answer; the engine never computes authoritative conflicts
/// locally because professor and room availability span sections it cannot
/// see.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ScheduleService: Send + Sync {
    /// Fetch the full schedule state of a section.
    ///
    /// Subjects carry their already-placed slots nested in `schedule_slots`.
    async fn fetch_section_schedule(
        &self,
        section_id: SectionId,
    ) -> BackendResult<SectionScheduleData>;

    /// Create or update a slot.
    ///
    /// Creates when `slot.id` is `None`, updates otherwise. Returns the
    /// saved slot with its backend-assigned id.
    async fn save_slot(&self, slot: Slot) -> BackendResult<Slot>;

    /// Delete a slot. Destructive; there is no soft-delete.
    async fn delete_slot(&self, slot_id: SlotId) -> BackendResult<()>;

    /// Does the section already have any slot overlapping the proposed
    /// day/time, for any subject?
    async fn check_section_conflict(
        &self,
        query: SectionConflictQuery,
    ) -> BackendResult<ConflictCheck>;

    /// Does the professor already teach elsewhere at the proposed day/time,
    /// in any section of the semester?
    async fn check_professor_conflict(
        &self,
        query: ProfessorConflictQuery,
    ) -> BackendResult<ConflictCheck>;

    /// Is the room already occupied at the proposed day/time?
    async fn check_room_conflict(&self, query: RoomConflictQuery)
        -> BackendResult<ConflictCheck>;

    /// Materialize the section–subject(–professor) linkage.
    ///
    /// Called lazily the first time a subject is scheduled; slots reference
    /// the returned id.
    async fn create_section_subject(
        &self,
        request: NewSectionSubject,
    ) -> BackendResult<SectionSubjectId>;

    /// Every slot a professor teaches in a semester, across all sections.
    ///
    /// Used to paint the professor's busy cells as an overlay during drag
    /// interactions.
    async fn fetch_professor_schedule(
        &self,
        professor_id: ProfessorId,
        semester_id: SemesterId,
    ) -> BackendResult<Vec<Slot>>;
}

/// Backend implementation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// In-memory local service
    Local,
    /// REST client against the management backend
    Rest,
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "rest" | "http" => Ok(Self::Rest),
            _ => Err(format!("Unknown backend type: {}", s)),
        }
    }
}

/// Construct a schedule service from engine configuration.
pub fn service_from_config(config: &EngineConfig) -> BackendResult<Arc<dyn ScheduleService>> {
    let kind: ServiceKind = config
        .backend
        .backend_type
        .parse()
        .map_err(BackendError::configuration)?;

    match kind {
        ServiceKind::Local => {
            #[cfg(feature = "local-backend")]
            {
                Ok(Arc::new(LocalScheduleService::new()))
            }
            #[cfg(not(feature = "local-backend"))]
            {
                Err(BackendError::configuration(
                    "Local backend feature not enabled",
                ))
            }
        }
        ServiceKind::Rest => {
            #[cfg(feature = "rest-backend")]
            {
                let service = RestScheduleService::from_settings(&config.backend)?;
                Ok(Arc::new(service))
            }
            #[cfg(not(feature = "rest-backend"))]
            {
                Err(BackendError::configuration(
                    "REST backend feature not enabled",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_kind_from_str() {
        assert_eq!("local".parse::<ServiceKind>().unwrap(), ServiceKind::Local);
        assert_eq!("REST".parse::<ServiceKind>().unwrap(), ServiceKind::Rest);
        assert_eq!("http".parse::<ServiceKind>().unwrap(), ServiceKind::Rest);
        assert!("oracle".parse::<ServiceKind>().is_err());
    }

    #[cfg(feature = "local-backend")]
    #[test]
    fn test_factory_builds_local_service() {
        let config = EngineConfig::default();
        assert!(service_from_config(&config).is_ok());
    }

    #[test]
    fn test_factory_rejects_unknown_type() {
        let mut config = EngineConfig::default();
        config.backend.backend_type = "oracle".to_string();
        assert!(service_from_config(&config).is_err());
    }
}
