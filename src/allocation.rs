// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Police Allocation

use serde::{Deserialize, Serialize};

use crate::district::{DistrictId, DistrictMap};
use crate::types::Shift;

/// Total sworn officers available to the city.
pub const TOTAL_FORCE: u32 = 20;

/// Every district keeps at least one officer on each shift.
pub const MIN_PER_SHIFT: u32 = 1;

/// Officers in a single district above this count read as an occupying
/// presence and erode trust (see the dynamics module).
pub const OVERPOLICING_THRESHOLD: u32 = 7;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected allocation edits. The caller retains the prior valid allocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("each shift needs at least {MIN_PER_SHIFT} officer")]
    ShiftBelowMinimum,

    #[error("allocation of {requested} exceeds the {TOTAL_FORCE}-officer force ({available} available)")]
    ExceedsForce { requested: u32, available: u32 },
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAllocation {
    pub day: u32,
    pub night: u32,
}

impl ShiftAllocation {
    pub fn total(&self) -> u32 {
        self.day + self.night
    }

    pub fn get(&self, shift: Shift) -> u32 {
        match shift {
            Shift::Day => self.day,
            Shift::Night => self.night,
        }
    }
}

/// Per-district day/night officer counts plus the unallocated reserve.
/// Invariant: `sum(day + night) + unallocated == TOTAL_FORCE`, every shift
/// `>= MIN_PER_SHIFT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoliceAllocation {
    pub districts: DistrictMap<ShiftAllocation>,
    pub unallocated: u32,
}

impl Default for PoliceAllocation {
    /// Starting deployment: five officers per district, 3 day / 2 night,
    /// nothing in reserve.
    fn default() -> Self {
        Self {
            districts: DistrictMap::from_fn(|_| ShiftAllocation { day: 3, night: 2 }),
            unallocated: 0,
        }
    }
}

impl PoliceAllocation {
    /// Officers deployed across all districts (excludes the reserve).
    pub fn total_allocated(&self) -> u32 {
        self.districts.iter().map(|(_, s)| s.total()).sum()
    }

    /// Return a copy with one shift count changed, or reject the edit.
    /// The receiver is untouched either way.
    pub fn with_shift_count(
        &self,
        district: DistrictId,
        shift: Shift,
        count: u32,
    ) -> Result<PoliceAllocation, AllocationError> {
        if count < MIN_PER_SHIFT {
            return Err(AllocationError::ShiftBelowMinimum);
        }

        let mut next = *self;
        let slot = next.districts.get_mut(district);
        match shift {
            Shift::Day => slot.day = count,
            Shift::Night => slot.night = count,
        }

        let allocated = next.total_allocated();
        if allocated > TOTAL_FORCE {
            let current = self.districts.get(district).get(shift);
            return Err(AllocationError::ExceedsForce {
                requested: count,
                available: self.unallocated + current,
            });
        }
        next.unallocated = TOTAL_FORCE - allocated;
        Ok(next)
    }

    /// Whether the invariant holds. Catalog-grade states always pass; this is
    /// the resolver's defense against hand-built allocations.
    pub fn check_invariant(&self) -> Result<(), AllocationError> {
        for (_, s) in self.districts.iter() {
            if s.day < MIN_PER_SHIFT || s.night < MIN_PER_SHIFT {
                return Err(AllocationError::ShiftBelowMinimum);
            }
        }
        let allocated = self.total_allocated();
        if allocated + self.unallocated != TOTAL_FORCE {
            return Err(AllocationError::ExceedsForce {
                requested: allocated,
                available: TOTAL_FORCE,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
