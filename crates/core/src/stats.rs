//! Execution statistics collection and reporting.
//!
//! Tracks the counters the simulator exposes after (or during) a run:
//! 1. **Cycles:** instructions executed this run.
//! 2. **Memory traffic:** read and write operation counts.
//! 3. **Cache:** hit and miss counts (`accesses == hits + misses` always).
//! 4. **Time:** accumulated simulated time in abstract units.
//!
//! All counters are monotonic within a run and zeroed by a reset.

use serde::Serialize;

/// Snapshot of the execution counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    /// Instructions executed this run.
    pub cycles: u64,
    /// Read operations (RAM loads, cache-miss fills, disk reads).
    pub read_ops: u64,
    /// Write operations (RAM stores, disk writes).
    pub write_ops: u64,
    /// Cache lookups that found the address present.
    pub cache_hits: u64,
    /// Cache lookups that had to synthesize and fill.
    pub cache_misses: u64,
    /// Accumulated simulated time, in abstract units.
    pub sim_time: f64,
}

impl RunStats {
    /// Total cache lookups performed this run.
    pub fn cache_accesses(&self) -> u64 {
        self.cache_hits + self.cache_misses
    }

    /// Cache hit rate in percent, or 0 when no lookups happened.
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_accesses();
        if total == 0 {
            0.0
        } else {
            (self.cache_hits as f64 / total as f64) * 100.0
        }
    }

    /// Renders the sectioned text report.
    pub fn report(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(out, "==========================================");
        let _ = writeln!(out, "SIMULATION STATISTICS");
        let _ = writeln!(out, "==========================================");
        let _ = writeln!(out, "cycles            {}", self.cycles);
        let _ = writeln!(out, "sim_time          {:.1}", self.sim_time);
        let _ = writeln!(out, "------------------------------------------");
        let _ = writeln!(out, "MEMORY TRAFFIC");
        let _ = writeln!(out, "  ops.read        {}", self.read_ops);
        let _ = writeln!(out, "  ops.write       {}", self.write_ops);
        let _ = writeln!(out, "------------------------------------------");
        let _ = writeln!(out, "CACHE");
        let _ = writeln!(out, "  accesses        {}", self.cache_accesses());
        let _ = writeln!(out, "  hits            {}", self.cache_hits);
        let _ = writeln!(out, "  misses          {}", self.cache_misses);
        let _ = writeln!(out, "  hit_rate        {:.2}%", self.cache_hit_rate());
        let _ = writeln!(out, "==========================================");
        out
    }

    /// Prints the text report to stdout.
    pub fn print(&self) {
        print!("{}", self.report());
    }
}
