//! Disk model: sectors, allocation map, and a movable head.
//!
//! Reads and writes cost a flat per-operation time; only head travel scales
//! with distance. Sector contents survive an engine reset (the disk is the
//! non-volatile tier); the head parks at sector 0.

use crate::common::rng::XorShift64;
use crate::config::DiskConfig;

/// One disk sector: a stored word plus an allocation flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sector {
    /// The stored word.
    pub value: i64,
    /// Whether the sector is marked in use.
    pub allocated: bool,
}

/// Fixed-geometry disk with a movable head.
#[derive(Debug, Clone)]
pub struct Disk {
    sectors: Vec<Sector>,
    head: usize,
    seek_time_per_sector: f64,
}

impl Disk {
    /// Formats a disk per `config`: every sector gets a synthesized value in
    /// `1..=100` drawn from `rng`, and the first `preallocated` sectors are
    /// marked in use.
    pub fn new(config: &DiskConfig, rng: &mut XorShift64) -> Self {
        let sectors = (0..config.sectors)
            .map(|i| Sector {
                value: rng.next_below(100) as i64 + 1,
                allocated: i < config.preallocated,
            })
            .collect();
        Self {
            sectors,
            head: 0,
            seek_time_per_sector: config.seek_time_per_sector,
        }
    }

    /// Number of sectors.
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Current head position.
    pub fn head(&self) -> usize {
        self.head
    }

    /// The word stored in `sector`, or `None` when out of range.
    pub fn read(&self, sector: usize) -> Option<i64> {
        self.sectors.get(sector).map(|s| s.value)
    }

    /// Writes `value` into `sector` and marks it allocated; returns `false`
    /// when out of range.
    pub fn write(&mut self, sector: usize, value: i64) -> bool {
        match self.sectors.get_mut(sector) {
            Some(slot) => {
                slot.value = value;
                slot.allocated = true;
                true
            }
            None => false,
        }
    }

    /// Whether `sector` is marked in use; out-of-range reads as `false`.
    pub fn is_allocated(&self, sector: usize) -> bool {
        self.sectors.get(sector).is_some_and(|s| s.allocated)
    }

    /// Moves the head to `sector`, returning the travel cost
    /// (`seek_time_per_sector * |sector - head|`), or `None` when out of
    /// range. The cost is path-dependent: two seeks cost the sum of both
    /// distances, not the distance between the endpoints.
    pub fn seek(&mut self, sector: usize) -> Option<f64> {
        if sector >= self.sectors.len() {
            return None;
        }
        let distance = sector.abs_diff(self.head);
        self.head = sector;
        Some(self.seek_time_per_sector * distance as f64)
    }

    /// All sectors, for goal predicates and inspection.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Parks the head at sector 0. Contents are kept: the disk is the
    /// non-volatile tier and survives engine resets.
    pub fn park(&mut self) {
        self.head = 0;
    }
}
