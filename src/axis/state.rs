//! Axis states and the task chain.

/// High-level axis state.
///
/// `Undefined` and `Idle` are control sentinels: `Undefined` is never
/// dispatched as a running state, and `Idle` is where every failure path
/// lands. The raw values are stable and shared with the external command
/// interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AxisState {
    /// No state. Sentinel for "no pending request" and an exhausted chain.
    #[default]
    Undefined = 0,
    /// Disarmed, estimators tracking for diagnostics only.
    Idle = 1,
    /// Expandable request: run the configured startup sequence.
    StartupSequence = 2,
    /// Expandable request: run motor then encoder calibration.
    FullCalibrationSequence = 3,
    /// Run the motor parameter calibration routine.
    MotorCalibration = 4,
    /// Run the encoder calibration routine.
    EncoderCalibration = 5,
    /// Open-loop spin-up followed by sensorless closed-loop control.
    SensorlessControl = 6,
    /// Closed-loop control from the position sensor.
    ClosedLoopControl = 7,
}

impl AxisState {
    /// Raw value for the shared request cell and the command interface.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a raw value from the command interface.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AxisState::Undefined),
            1 => Some(AxisState::Idle),
            2 => Some(AxisState::StartupSequence),
            3 => Some(AxisState::FullCalibrationSequence),
            4 => Some(AxisState::MotorCalibration),
            5 => Some(AxisState::EncoderCalibration),
            6 => Some(AxisState::SensorlessControl),
            7 => Some(AxisState::ClosedLoopControl),
            _ => None,
        }
    }

    /// Whether dispatching this state requires a calibrated motor.
    #[inline]
    pub const fn requires_motor_calibration(self) -> bool {
        matches!(
            self,
            AxisState::EncoderCalibration
                | AxisState::SensorlessControl
                | AxisState::ClosedLoopControl
        )
    }

    /// Whether dispatching this state requires a calibrated encoder.
    #[inline]
    pub const fn requires_encoder_calibration(self) -> bool {
        matches!(
            self,
            AxisState::SensorlessControl | AxisState::ClosedLoopControl
        )
    }
}

/// Capacity of the task chain.
///
/// Sized for the longest expansion (startup sequence: two calibrations, one
/// control state, idle) with headroom.
pub const TASK_CHAIN_CAPACITY: usize = 8;

/// Ordered queue of pending primitive states derived from one top-level
/// request.
///
/// The front element is the state currently being run. The chain is only
/// rewritten wholesale when a new request arrives; a successful step drops
/// the front, a failed step collapses the whole chain to `[Idle]`. Length is
/// tracked explicitly and every insertion is bounds-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChain {
    states: heapless::Vec<AxisState, TASK_CHAIN_CAPACITY>,
}

impl TaskChain {
    /// Create an empty chain.
    pub const fn new() -> Self {
        Self {
            states: heapless::Vec::new(),
        }
    }

    /// The state at the front of the chain, `Undefined` when exhausted.
    #[inline]
    pub fn head(&self) -> AxisState {
        self.states.first().copied().unwrap_or(AxisState::Undefined)
    }

    /// Number of pending states.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the chain is exhausted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The pending states, front first.
    #[inline]
    pub fn as_slice(&self) -> &[AxisState] {
        &self.states
    }

    /// Replace the whole chain with a new plan.
    ///
    /// Returns `false` and collapses to `[Idle]` if the plan exceeds the
    /// chain capacity.
    pub fn load(&mut self, plan: &[AxisState]) -> bool {
        self.states.clear();
        if self.states.extend_from_slice(plan).is_err() {
            self.collapse_to_idle();
            return false;
        }
        true
    }

    /// Overwrite the front of the chain (calibration-prerequisite downgrade).
    ///
    /// No-op on an exhausted chain.
    pub fn set_head(&mut self, state: AxisState) {
        if let Some(head) = self.states.first_mut() {
            *head = state;
        }
    }

    /// Drop the front state after it completed successfully.
    pub fn advance(&mut self) {
        if !self.states.is_empty() {
            self.states.remove(0);
        }
    }

    /// Abandon the remaining plan and fall back to `[Idle]`.
    pub fn collapse_to_idle(&mut self) {
        self.states.clear();
        // Cannot fail: the chain was just cleared and capacity is nonzero.
        let _ = self.states.push(AxisState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_head_is_undefined() {
        let chain = TaskChain::new();
        assert_eq!(chain.head(), AxisState::Undefined);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_load_and_advance() {
        let mut chain = TaskChain::new();
        assert!(chain.load(&[
            AxisState::MotorCalibration,
            AxisState::EncoderCalibration,
            AxisState::Idle,
        ]));
        assert_eq!(chain.head(), AxisState::MotorCalibration);

        chain.advance();
        assert_eq!(chain.head(), AxisState::EncoderCalibration);

        chain.advance();
        assert_eq!(chain.head(), AxisState::Idle);

        chain.advance();
        assert_eq!(chain.head(), AxisState::Undefined);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_collapse_abandons_plan() {
        let mut chain = TaskChain::new();
        assert!(chain.load(&[
            AxisState::MotorCalibration,
            AxisState::EncoderCalibration,
            AxisState::ClosedLoopControl,
            AxisState::Idle,
        ]));
        chain.collapse_to_idle();
        assert_eq!(chain.as_slice(), [AxisState::Idle]);
    }

    #[test]
    fn test_load_rejects_oversized_plan() {
        let mut chain = TaskChain::new();
        let plan = [AxisState::Idle; TASK_CHAIN_CAPACITY + 1];
        assert!(!chain.load(&plan));
        // Oversized plans fail safe
        assert_eq!(chain.as_slice(), [AxisState::Idle]);
    }

    #[test]
    fn test_set_head_downgrade() {
        let mut chain = TaskChain::new();
        assert!(chain.load(&[AxisState::ClosedLoopControl, AxisState::Idle]));
        chain.set_head(AxisState::Undefined);
        assert_eq!(chain.as_slice(), [AxisState::Undefined, AxisState::Idle]);
    }

    #[test]
    fn test_set_head_on_empty_chain_is_noop() {
        let mut chain = TaskChain::new();
        chain.set_head(AxisState::Idle);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_state_code_round_trip() {
        for code in 0u8..=7 {
            let state = AxisState::from_code(code).expect("valid code");
            assert_eq!(state.code(), code);
        }
        assert_eq!(AxisState::from_code(8), None);
        assert_eq!(AxisState::from_code(255), None);
    }

    #[test]
    fn test_calibration_prerequisites() {
        assert!(AxisState::ClosedLoopControl.requires_motor_calibration());
        assert!(AxisState::ClosedLoopControl.requires_encoder_calibration());
        assert!(AxisState::SensorlessControl.requires_motor_calibration());
        assert!(AxisState::SensorlessControl.requires_encoder_calibration());
        assert!(AxisState::EncoderCalibration.requires_motor_calibration());
        assert!(!AxisState::MotorCalibration.requires_motor_calibration());
        assert!(!AxisState::Idle.requires_motor_calibration());
    }
}
