//! Cross-context shared state.
//!
//! Three execution contexts touch an axis: the state-machine worker, the
//! current-measurement interrupt, and the step/dir edge interrupt, plus the
//! external command interface. None of them may block on a lock, so
//! everything shared lives in this block of atomic scalar cells. Each cell
//! has a single writer and a single reader; relaxed ordering is sufficient
//! for that contract (values become visible "eventually", which the design
//! tolerates).

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::error::AxisError;

use super::state::AxisState;

/// Lock-free shared cells for one axis.
///
/// Collaborator components receive a read-only reference to this block at
/// construction; it replaces a back-pointer to the owning axis.
#[derive(Debug)]
pub struct SharedAxisState {
    /// Pending top-level request, `0` when none. Last write wins.
    requested_state: AtomicU8,
    /// Currently running state, for status reporting.
    current_state: AtomicU8,
    /// Sticky fault code, `0` when none.
    error: AtomicU8,
    /// Position setpoint in encoder counts, stored as f32 bits.
    pos_setpoint: AtomicU32,
    /// Latest DC bus voltage sample, stored as f32 bits.
    vbus_voltage: AtomicU32,
    /// Whether step/dir edges are currently accepted.
    step_dir_enabled: AtomicBool,
}

impl SharedAxisState {
    /// Create a fresh cell block: no request, no error, zero setpoint,
    /// zero bus voltage (brownout until the first real sample arrives).
    pub const fn new() -> Self {
        Self {
            requested_state: AtomicU8::new(0),
            current_state: AtomicU8::new(0),
            error: AtomicU8::new(0),
            pos_setpoint: AtomicU32::new(0),
            vbus_voltage: AtomicU32::new(0),
            step_dir_enabled: AtomicBool::new(false),
        }
    }

    // --- Command interface ---------------------------------------------

    /// Request a top-level state change.
    ///
    /// Consumed by the state machine at its next iteration boundary. A
    /// second request before then overwrites the first.
    pub fn request_state(&self, state: AxisState) {
        self.requested_state.store(state.code(), Ordering::Relaxed);
    }

    /// Request a state change by raw value (wire interface).
    ///
    /// Values that do not name a state are consumed by the state machine as
    /// an invalid-state fault.
    pub fn request_state_raw(&self, raw: u8) {
        self.requested_state.store(raw, Ordering::Relaxed);
    }

    /// Whether a request is waiting to be consumed.
    pub fn request_pending(&self) -> bool {
        self.requested_state.load(Ordering::Relaxed) != 0
    }

    /// Consume the pending request, leaving the slot empty.
    pub(crate) fn take_requested_raw(&self) -> u8 {
        self.requested_state.swap(0, Ordering::Relaxed)
    }

    // --- Telemetry ------------------------------------------------------

    /// The state the axis is currently running.
    pub fn current_state(&self) -> AxisState {
        AxisState::from_code(self.current_state.load(Ordering::Relaxed))
            .unwrap_or(AxisState::Undefined)
    }

    pub(crate) fn set_current_state(&self, state: AxisState) {
        self.current_state.store(state.code(), Ordering::Relaxed);
    }

    /// The sticky fault code, `None` when the axis is healthy.
    pub fn error(&self) -> Option<AxisError> {
        AxisError::from_code(self.error.load(Ordering::Relaxed))
    }

    /// Record a fault. Last one wins; stays set until a successful re-arm.
    pub(crate) fn set_error(&self, error: AxisError) {
        self.error.store(error.code(), Ordering::Relaxed);
    }

    pub(crate) fn clear_error(&self) {
        self.error.store(0, Ordering::Relaxed);
    }

    // --- Position setpoint ---------------------------------------------

    /// Current position setpoint in encoder counts.
    pub fn pos_setpoint(&self) -> f32 {
        f32::from_bits(self.pos_setpoint.load(Ordering::Relaxed))
    }

    /// Overwrite the position setpoint.
    pub fn set_pos_setpoint(&self, counts: f32) {
        self.pos_setpoint.store(counts.to_bits(), Ordering::Relaxed);
    }

    /// Add to the position setpoint (step/dir edge handler).
    ///
    /// Lock-free read-modify-write; safe to call from interrupt context.
    pub fn add_pos_setpoint(&self, delta_counts: f32) {
        let _ = self
            .pos_setpoint
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f32::from_bits(bits) + delta_counts).to_bits())
            });
    }

    // --- Bus voltage ----------------------------------------------------

    /// Latest DC bus voltage sample in volts.
    pub fn vbus_voltage(&self) -> f32 {
        f32::from_bits(self.vbus_voltage.load(Ordering::Relaxed))
    }

    /// Publish a DC bus voltage sample (ADC context).
    pub fn set_vbus_voltage(&self, volts: f32) {
        self.vbus_voltage.store(volts.to_bits(), Ordering::Relaxed);
    }

    // --- Step/dir gate --------------------------------------------------

    /// Whether step/dir edges are currently accepted.
    pub fn step_dir_enabled(&self) -> bool {
        self.step_dir_enabled.load(Ordering::Relaxed)
    }

    pub(crate) fn set_step_dir_enabled(&self, enabled: bool) {
        self.step_dir_enabled.store(enabled, Ordering::Relaxed);
    }
}

impl Default for SharedAxisState {
    fn default() -> Self {
        Self::new()
    }
}
