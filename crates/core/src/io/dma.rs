//! Toy DMA controller and interrupt queue.
//!
//! A deliberately small model of device-driven data movement: a host queues
//! a transfer toward an input port, at most two transfers progress at once,
//! and each completes after simulated time proportional to its payload size.
//! Completions raise interrupts; servicing an interrupt delivers the payload
//! into the destination port's queue, where `IN` picks it up. Interrupts are
//! serviced strictly in priority order.
//!
//! The controller advances on the engine's simulated-time axis, one delta
//! per executed instruction. Nothing in the core depends on it being used.

use std::collections::VecDeque;

use tracing::debug;

use super::Ports;
use crate::config::IoConfig;

/// Priority assigned to device-input interrupts.
pub const PRIORITY_DEVICE_INPUT: u8 = 3;
/// Priority assigned to DMA-completion interrupts.
pub const PRIORITY_DMA_COMPLETE: u8 = 5;

/// What a pending interrupt wants done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterruptKind {
    /// A device produced one word for an input port.
    DeviceInput {
        /// Destination input port index.
        port: usize,
        /// The produced word.
        value: i64,
    },
    /// A DMA transfer finished moving its payload.
    DmaComplete {
        /// Transfer id, as returned by [`DmaController::queue_transfer`].
        id: u64,
        /// Destination input port index.
        port: usize,
        /// The transferred word.
        value: i64,
    },
}

/// A prioritized interrupt waiting to be serviced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interrupt {
    /// Higher services first.
    pub priority: u8,
    /// The request itself.
    pub kind: InterruptKind,
}

#[derive(Debug, Clone)]
struct Transfer {
    id: u64,
    port: usize,
    value: i64,
    remaining: f64,
}

/// DMA controller: a transfer queue with a bounded active set.
#[derive(Debug, Clone)]
pub struct DmaController {
    queue: VecDeque<Transfer>,
    active: Vec<Transfer>,
    interrupts: Vec<Interrupt>,
    active_limit: usize,
    block_bytes: usize,
    block_time: f64,
    next_id: u64,
}

impl DmaController {
    /// Creates an idle controller per `config`.
    pub fn new(config: &IoConfig) -> Self {
        Self {
            queue: VecDeque::new(),
            active: Vec::new(),
            interrupts: Vec::new(),
            active_limit: config.dma_active_limit,
            block_bytes: config.dma_block_bytes.max(1),
            block_time: config.dma_block_time,
            next_id: 0,
        }
    }

    /// Queues a transfer of one `value` word (modeled as `size_bytes` of
    /// payload) toward input port `port`. Returns the transfer id.
    ///
    /// The transfer takes `block_time * size_bytes / block_bytes` simulated
    /// time units once it becomes active.
    pub fn queue_transfer(&mut self, port: usize, value: i64, size_bytes: usize) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let cost = self.block_time * size_bytes as f64 / self.block_bytes as f64;
        self.queue.push_back(Transfer {
            id,
            port,
            value,
            remaining: cost,
        });
        debug!(id, port, size_bytes, "dma transfer queued");
        id
    }

    /// Raises an interrupt directly, as a device would.
    pub fn raise(&mut self, interrupt: Interrupt) {
        self.interrupts.push(interrupt);
    }

    /// Transfers currently in flight.
    pub fn active_transfers(&self) -> usize {
        self.active.len()
    }

    /// Transfers waiting for an active slot.
    pub fn queued_transfers(&self) -> usize {
        self.queue.len()
    }

    /// Advances the controller by `dt` simulated time units and services
    /// every pending interrupt into `ports`, highest priority first.
    pub fn advance(&mut self, dt: f64, ports: &mut Ports) {
        // Fill free active slots before progressing time.
        while self.active.len() < self.active_limit {
            match self.queue.pop_front() {
                Some(t) => self.active.push(t),
                None => break,
            }
        }

        if dt > 0.0 {
            for t in &mut self.active {
                t.remaining -= dt;
            }
        }

        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].remaining <= 0.0 {
                let done = self.active.remove(i);
                debug!(id = done.id, port = done.port, "dma transfer complete");
                self.interrupts.push(Interrupt {
                    priority: PRIORITY_DMA_COMPLETE,
                    kind: InterruptKind::DmaComplete {
                        id: done.id,
                        port: done.port,
                        value: done.value,
                    },
                });
            } else {
                i += 1;
            }
        }

        self.service_interrupts(ports);
    }

    /// Delivers every pending interrupt, highest priority first. Ties keep
    /// their arrival order.
    fn service_interrupts(&mut self, ports: &mut Ports) {
        if self.interrupts.is_empty() {
            return;
        }
        let mut pending = std::mem::take(&mut self.interrupts);
        pending.sort_by(|a, b| b.priority.cmp(&a.priority));
        for interrupt in pending {
            match interrupt.kind {
                InterruptKind::DeviceInput { port, value }
                | InterruptKind::DmaComplete { port, value, .. } => {
                    if !ports.push_input(port, value) {
                        debug!(port, "interrupt dropped: no such input port");
                    }
                }
            }
        }
    }

    /// Drops all queued and active transfers and pending interrupts.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.active.clear();
        self.interrupts.clear();
    }
}
