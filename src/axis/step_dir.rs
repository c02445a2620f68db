//! Step/direction input bridge.
//!
//! Converts GPIO step edges into position-setpoint increments. The edge
//! handler runs in interrupt context, so it must finish in bounded time
//! without blocking: one DIR pin read plus one lock-free setpoint update.

use embedded_hal::digital::InputPin;

use super::shared::SharedAxisState;

/// Interrupt-side half of the step/dir interface.
///
/// The embedding firmware subscribes this bridge to rising edges of the STEP
/// pin and calls [`on_step_edge`](StepDirBridge::on_step_edge) from the edge
/// handler. Edges are ignored while the axis has step/dir input disabled;
/// the state machine gates that flag around its control loops.
pub struct StepDirBridge<'a, DIR: InputPin> {
    dir_pin: DIR,
    shared: &'a SharedAxisState,
    counts_per_step: f32,
}

impl<'a, DIR: InputPin> StepDirBridge<'a, DIR> {
    /// Create a bridge reading direction from `dir_pin`.
    ///
    /// `counts_per_step` is the setpoint change per step pulse, in encoder
    /// counts.
    pub fn new(dir_pin: DIR, shared: &'a SharedAxisState, counts_per_step: f32) -> Self {
        Self {
            dir_pin,
            shared,
            counts_per_step,
        }
    }

    /// Handle one rising edge of the STEP pin.
    ///
    /// DIR high increments the position setpoint, DIR low decrements it.
    /// Pulses arriving while step/dir input is disabled are dropped, as are
    /// pulses whose DIR pin cannot be read.
    pub fn on_step_edge(&mut self) {
        if !self.shared.step_dir_enabled() {
            return;
        }

        let dir = match self.dir_pin.is_high() {
            Ok(true) => 1.0,
            Ok(false) => -1.0,
            Err(_) => return,
        };

        self.shared.add_pos_setpoint(dir * self.counts_per_step);
    }

    /// Tear the bridge down, handing the DIR pin back.
    pub fn release(self) -> DIR {
        self.dir_pin
    }
}
