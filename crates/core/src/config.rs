//! Configuration for the simulator.
//!
//! This module defines the structures that parameterize an [`Engine`]:
//! 1. **Defaults:** baseline machine constants (register count, memory and
//!    disk geometry, access costs, PRNG seed).
//! 2. **Structures:** hierarchical config for memory, disk, and I/O.
//!
//! Use `Config::default()` programmatically, or deserialize a JSON document
//! (every field is optional and falls back to its default).
//!
//! [`Engine`]: crate::core::Engine

use serde::Deserialize;

/// Default machine constants.
///
/// These values reproduce the original classroom machine: 8 registers, 1 KiB
/// of word-addressed RAM, a 64-sector disk with the first 20 sectors in use,
/// and the canonical access costs (RAM 100, cache hit 1, disk 10, seek 0.5
/// per sector, all in abstract simulated time units).
mod defaults {
    /// Number of general-purpose registers (`R1`..`R8`).
    pub const REGISTERS: usize = 8;

    /// Main memory size in words.
    pub const MEMORY_WORDS: usize = 1024;

    /// Simulated time units for one RAM access (load, store, or miss fill).
    pub const RAM_ACCESS_TIME: f64 = 100.0;

    /// Simulated time units for a cache hit.
    pub const CACHE_HIT_TIME: f64 = 1.0;

    /// Exclusive upper bound for synthesized values (cache-miss fills and
    /// empty-input reads): `0..100`.
    pub const SYNTH_VALUE_BOUND: u64 = 100;

    /// Number of disk sectors.
    pub const DISK_SECTORS: usize = 64;

    /// Sectors marked allocated when the disk is formatted.
    pub const DISK_PREALLOCATED: usize = 20;

    /// Simulated time units for one sector read or write.
    pub const DISK_ACCESS_TIME: f64 = 10.0;

    /// Simulated time units per sector of head travel.
    pub const SEEK_TIME_PER_SECTOR: f64 = 0.5;

    /// Number of input ports (`IN0`..).
    pub const INPUT_PORTS: usize = 2;

    /// Number of output ports (`OUT0`..).
    pub const OUTPUT_PORTS: usize = 2;

    /// Maximum simultaneously active DMA transfers.
    pub const DMA_ACTIVE_LIMIT: usize = 2;

    /// Payload block size (bytes) used to scale DMA transfer time.
    pub const DMA_BLOCK_BYTES: usize = 1024;

    /// Simulated time units to move one DMA block.
    pub const DMA_BLOCK_TIME: f64 = 100.0;

    /// PRNG seed. Any fixed seed gives fully reproducible runs.
    pub const SEED: u64 = 123_456_789;

    /// Safety valve for `Engine::run`: maximum instructions per call.
    pub const STEP_LIMIT: u64 = 100_000;
}

/// Main memory and cache parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Main memory size in words.
    pub words: usize,
    /// Simulated time for one RAM access.
    pub ram_access_time: f64,
    /// Simulated time for a cache hit.
    pub cache_hit_time: f64,
    /// Exclusive upper bound for synthesized cache-miss values.
    pub synth_value_bound: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            words: defaults::MEMORY_WORDS,
            ram_access_time: defaults::RAM_ACCESS_TIME,
            cache_hit_time: defaults::CACHE_HIT_TIME,
            synth_value_bound: defaults::SYNTH_VALUE_BOUND,
        }
    }
}

/// Disk geometry and timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    /// Number of sectors.
    pub sectors: usize,
    /// Sectors marked allocated when the disk is formatted.
    pub preallocated: usize,
    /// Simulated time for one sector read or write.
    pub access_time: f64,
    /// Simulated time per sector of head travel during a seek.
    pub seek_time_per_sector: f64,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            sectors: defaults::DISK_SECTORS,
            preallocated: defaults::DISK_PREALLOCATED,
            access_time: defaults::DISK_ACCESS_TIME,
            seek_time_per_sector: defaults::SEEK_TIME_PER_SECTOR,
        }
    }
}

/// I/O port and DMA parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Number of input ports (`IN0`..).
    pub input_ports: usize,
    /// Number of output ports (`OUT0`..).
    pub output_ports: usize,
    /// Maximum simultaneously active DMA transfers.
    pub dma_active_limit: usize,
    /// Payload block size (bytes) used to scale DMA transfer time.
    pub dma_block_bytes: usize,
    /// Simulated time units to move one DMA block.
    pub dma_block_time: f64,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_ports: defaults::INPUT_PORTS,
            output_ports: defaults::OUTPUT_PORTS,
            dma_active_limit: defaults::DMA_ACTIVE_LIMIT,
            dma_block_bytes: defaults::DMA_BLOCK_BYTES,
            dma_block_time: defaults::DMA_BLOCK_TIME,
        }
    }
}

/// Root configuration consumed by [`Engine::new`].
///
/// [`Engine::new`]: crate::core::Engine::new
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of general-purpose registers.
    pub registers: usize,
    /// Main memory and cache parameters.
    pub memory: MemoryConfig,
    /// Disk geometry and timing.
    pub disk: DiskConfig,
    /// I/O port and DMA parameters.
    pub io: IoConfig,
    /// PRNG seed; a fixed seed gives fully reproducible runs.
    pub seed: u64,
    /// Maximum instructions executed per `Engine::run` call; `None` removes
    /// the safety valve entirely.
    pub step_limit: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registers: defaults::REGISTERS,
            memory: MemoryConfig::default(),
            disk: DiskConfig::default(),
            io: IoConfig::default(),
            seed: defaults::SEED,
            step_limit: Some(defaults::STEP_LIMIT),
        }
    }
}
