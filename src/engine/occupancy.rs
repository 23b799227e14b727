//! Occupancy resolution: from a slot set to a render plan.
//!
//! A multi-hour slot must appear on the grid once, as a single card spanning
//! several rows, rather than once per bucket. The resolver walks the slot
//! set and marks, for every `(day, bucket)` coordinate, whether the cell is
//! empty, the start of a span, or a continuation covered by an earlier span
//! (rendered as a merged cell that is skipped, not drawn).

use log::{debug, warn};

use crate::api::{Day, Slot};
use crate::models::grid::{duration_in_buckets, GridWindow};
use crate::models::time::TimeOfDay;

/// Render state of one `(day, bucket)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Nothing occupies the cell.
    Empty,
    /// Covered by a span that started in an earlier bucket; render nothing.
    Covered { slot_index: usize },
    /// A slot's card renders here, spanning `span` rows.
    Start { slot_index: usize, span: u32 },
}

/// Render plan for the visible grid.
///
/// Cell lookups are by `(day, bucket)`; `slot_index` values refer back into
/// the slot slice the plan was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPlan {
    days: Vec<Day>,
    times: Vec<TimeOfDay>,
    /// Row-major: `cells[bucket * days.len() + day_column]`.
    cells: Vec<CellState>,
}

impl GridPlan {
    fn empty(days: Vec<Day>, times: Vec<TimeOfDay>) -> Self {
        let cells = vec![CellState::Empty; days.len() * times.len()];
        Self { days, times, cells }
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    /// Bucket start times, one per grid row.
    pub fn times(&self) -> &[TimeOfDay] {
        &self.times
    }

    fn column(&self, day: Day) -> Option<usize> {
        self.days.iter().position(|d| *d == day)
    }

    /// Cell state at a coordinate. Out-of-range coordinates read as empty.
    pub fn cell(&self, day: Day, bucket: usize) -> CellState {
        match self.column(day) {
            Some(column) if bucket < self.times.len() => {
                self.cells[bucket * self.days.len() + column]
            }
            _ => CellState::Empty,
        }
    }

    fn cell_mut(&mut self, column: usize, bucket: usize) -> &mut CellState {
        &mut self.cells[bucket * self.days.len() + column]
    }

    /// Indices of the slots that made it onto the grid, in render order.
    pub fn rendered_slots(&self) -> Vec<usize> {
        self.cells
            .iter()
            .filter_map(|cell| match cell {
                CellState::Start { slot_index, .. } => Some(*slot_index),
                _ => None,
            })
            .collect()
    }
}

/// Resolve a slot set into a render plan for the given days and window.
///
/// Pure function of its inputs: the same slot set always yields an identical
/// plan. Slots starting outside the visible window are excluded. When two
/// slots claim the same cell the first seen in iteration order wins and the
/// loser is dropped from the plan with a data-integrity warning; the
/// conflict-prevention contract makes that state unreachable through this
/// engine, but imported data can carry it.
pub fn resolve_occupancy(slots: &[Slot], days: &[Day], window: &GridWindow) -> GridPlan {
    let times: Vec<TimeOfDay> = window.time_slots().collect();
    let mut plan = GridPlan::empty(days.to_vec(), times);

    for (slot_index, slot) in slots.iter().enumerate() {
        let Some(column) = plan.column(slot.day) else {
            debug!(
                "Slot {:?} on {} not in the displayed day set; skipping",
                slot.id, slot.day
            );
            continue;
        };
        let Some(start_bucket) = window.bucket_index(slot.start_time) else {
            debug!(
                "Slot {:?} starts at {} outside the {}:00-{}:00 window; skipping",
                slot.id, slot.start_time, window.start_hour, window.end_hour
            );
            continue;
        };

        let span = duration_in_buckets(slot.start_time, slot.end_time, window.granularity_minutes);
        // A span reaching past closing renders clipped rather than writing
        // out of range.
        let span = span.min((plan.times.len() - start_bucket) as u32);

        let range = start_bucket..start_bucket + span as usize;
        let collision = range
            .clone()
            .find(|bucket| plan.cell(slot.day, *bucket) != CellState::Empty);
        if let Some(bucket) = collision {
            warn!(
                "Slot {:?} collides with an earlier slot at ({}, bucket {}); dropping it from the grid",
                slot.id, slot.day, bucket
            );
            continue;
        }

        for bucket in range {
            *plan.cell_mut(column, bucket) = if bucket == start_bucket {
                CellState::Start { slot_index, span }
            } else {
                CellState::Covered { slot_index }
            };
        }
    }

    plan
}
