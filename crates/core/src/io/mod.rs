//! I/O ports and the toy transfer subsystem.
//!
//! Ports are named and directional: `IN0..` hold FIFO queues of words for
//! the `IN` instruction to consume, `OUT0..` collect everything the `OUT`
//! instruction writes. Using a port against its direction, or naming a port
//! that does not exist, is a device fault.
//!
//! On top of the ports sits a deliberately small DMA/interrupt model (see
//! [`dma`]): queued transfers complete after a size-proportional amount of
//! simulated time and deliver their payloads into input ports through a
//! priority-ordered interrupt queue. The engine works identically whether or
//! not anything ever uses it.

pub mod dma;

use std::collections::VecDeque;

use crate::config::IoConfig;

pub use dma::{DmaController, Interrupt, InterruptKind};

/// Identifies a resolved port: direction plus 0-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortId {
    /// An input port (`IN<n>`).
    Input(usize),
    /// An output port (`OUT<n>`).
    Output(usize),
}

/// The set of named I/O ports.
#[derive(Debug, Clone)]
pub struct Ports {
    inputs: Vec<VecDeque<i64>>,
    outputs: Vec<Vec<i64>>,
    consumed: Vec<i64>,
}

impl Ports {
    /// Creates `input_ports` input and `output_ports` output ports, all
    /// empty.
    pub fn new(config: &IoConfig) -> Self {
        Self {
            inputs: vec![VecDeque::new(); config.input_ports],
            outputs: vec![Vec::new(); config.output_ports],
            consumed: Vec::new(),
        }
    }

    /// Resolves a port name such as `IN0` or `OUT1` (case-insensitive).
    pub fn resolve(&self, name: &str) -> Option<PortId> {
        let upper = name.to_ascii_uppercase();
        if let Some(idx) = upper.strip_prefix("IN").and_then(|n| n.parse().ok()) {
            if idx < self.inputs.len() {
                return Some(PortId::Input(idx));
            }
        }
        if let Some(idx) = upper.strip_prefix("OUT").and_then(|n| n.parse().ok()) {
            if idx < self.outputs.len() {
                return Some(PortId::Output(idx));
            }
        }
        None
    }

    /// Queues `value` on input port `idx`; returns `false` when the port
    /// does not exist. This is how a host supplies data for `IN`.
    pub fn push_input(&mut self, idx: usize, value: i64) -> bool {
        match self.inputs.get_mut(idx) {
            Some(queue) => {
                queue.push_back(value);
                true
            }
            None => false,
        }
    }

    /// Consumes the next buffered word on input port `name`, falling back to
    /// `synthesize` when the queue is empty. Errors (with a reason string the
    /// engine wraps into a device fault) when the name is unknown or names an
    /// output port.
    pub fn read_input(
        &mut self,
        name: &str,
        synthesize: impl FnOnce() -> i64,
    ) -> Result<i64, String> {
        match self.resolve(name) {
            Some(PortId::Input(idx)) => {
                let value = self.inputs[idx].pop_front().unwrap_or_else(synthesize);
                self.consumed.push(value);
                Ok(value)
            }
            Some(PortId::Output(_)) => Err(format!("port {name} is not an input device")),
            None => Err(format!("unknown port {name}")),
        }
    }

    /// Appends `value` to output port `name`. Errors when the name is
    /// unknown or names an input port.
    pub fn write_output(&mut self, name: &str, value: i64) -> Result<(), String> {
        match self.resolve(name) {
            Some(PortId::Output(idx)) => {
                self.outputs[idx].push(value);
                Ok(())
            }
            Some(PortId::Input(_)) => Err(format!("port {name} is not an output device")),
            None => Err(format!("unknown port {name}")),
        }
    }

    /// Everything written to output port `idx`, in write order.
    pub fn output(&self, idx: usize) -> Option<&[i64]> {
        self.outputs.get(idx).map(Vec::as_slice)
    }

    /// Words still queued on input port `idx`.
    pub fn pending_input(&self, idx: usize) -> usize {
        self.inputs.get(idx).map_or(0, VecDeque::len)
    }

    /// Every word `IN` actually consumed this run, in chronological order
    /// across all ports. Goal predicates use this rather than the (already
    /// drained) queues.
    pub fn inputs_read(&self) -> &[i64] {
        &self.consumed
    }

    /// True when `value` appears on any output port.
    pub fn output_contains(&self, value: i64) -> bool {
        self.outputs.iter().any(|port| port.contains(&value))
    }

    /// Drains all queues, logs, and the consumed-input record.
    pub fn reset(&mut self) {
        for queue in &mut self.inputs {
            queue.clear();
        }
        for port in &mut self.outputs {
            port.clear();
        }
        self.consumed.clear();
    }
}
