//! # AIMS Scheduling Engine
//!
//! Weekly schedule allocation and conflict-detection engine for an academic
//! institution management system.
//!
//! This crate places discrete teaching assignments ("slots") onto a finite
//! weekly day/time grid, detects three independent classes of overlap
//! (section, professor, room), merges multi-hour assignments into grid cells
//! with correct span, and drives interactive placement while keeping the
//! grid consistent with an authoritative but remote schedule state. The
//! remote management backend owns all business rules; the engine reaches it
//! exclusively through the [`backend::ScheduleService`] trait.
//!
//! ## Features
//!
//! - **Time Grid**: fixed weekly coordinate system with pure conversions
//!   between wall-clock times and grid buckets at 30- or 60-minute
//!   granularity
//! - **Occupancy Resolution**: pure derivation of a render plan where a
//!   multi-hour class appears once, spanning rows, instead of once per bucket
//! - **Conflict Checking**: section (hard block), professor and room (soft
//!   warn) axes, each delegated to the backend, with conservative
//!   degradation on transport failure
//! - **Interactive Placement**: an arm-then-click or drag-and-drop state
//!   machine that validates before committing and reloads wholesale after
//!   every confirmed write
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: wire DTOs and newtype ids exchanged with the backend
//! - [`models`]: the time-of-day and grid coordinate types
//! - [`engine`]: registry, occupancy resolver, conflict checker, placement
//!   controller, and the pending/scheduled tracker
//! - [`backend`]: the `ScheduleService` trait with in-memory and REST
//!   implementations
//! - [`config`]: TOML engine configuration (placement policy, grid window,
//!   backend connection)

pub mod api;
pub mod backend;
pub mod config;
pub mod engine;
pub mod models;
