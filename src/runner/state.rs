//! Run state machine.
//!
//! A run moves forward through fixed phases:
//!
//! ```text
//! STARTED → PROBING → ENV_READY → DEPS_VALIDATED → CONFIG_CHECKED → SMOKE_TESTED → REPORTED
//! ```
//!
//! Any phase may be entered degraded, after which the run stays degraded
//! but keeps going. An environment failure ends the run in `FAILED`.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Started,
    Probing,
    EnvReady,
    DepsValidated,
    ConfigChecked,
    SmokeTested,
    Reported,
}

impl Phase {
    /// The only phase that may follow this one.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Started => Some(Phase::Probing),
            Phase::Probing => Some(Phase::EnvReady),
            Phase::EnvReady => Some(Phase::DepsValidated),
            Phase::DepsValidated => Some(Phase::ConfigChecked),
            Phase::ConfigChecked => Some(Phase::SmokeTested),
            Phase::SmokeTested => Some(Phase::Reported),
            Phase::Reported => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Started => "STARTED",
            Phase::Probing => "PROBING",
            Phase::EnvReady => "ENV_READY",
            Phase::DepsValidated => "DEPS_VALIDATED",
            Phase::ConfigChecked => "CONFIG_CHECKED",
            Phase::SmokeTested => "SMOKE_TESTED",
            Phase::Reported => "REPORTED",
        };
        f.write_str(name)
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "phase", rename_all = "snake_case")]
pub enum RunState {
    /// Healthy so far.
    Active(Phase),
    /// Some stage produced degrading results; the run continues.
    Degraded(Phase),
    /// Environment failure after the given phase. Terminal.
    Failed(Phase),
}

/// Rejected state transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition from {from} to {to}")]
pub struct TransitionError {
    pub from: String,
    pub to: Phase,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// A fresh run.
    pub fn new() -> Self {
        RunState::Active(Phase::Started)
    }

    /// The last phase reached.
    pub fn phase(&self) -> Phase {
        match self {
            RunState::Active(p) | RunState::Degraded(p) | RunState::Failed(p) => *p,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RunState::Degraded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunState::Failed(_))
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        self.is_failed() || self.phase() == Phase::Reported
    }

    /// Move to `to`, which must be the successor of the current phase.
    ///
    /// `degraded` marks the stage that just finished as having produced
    /// degrading results. Degradation is sticky.
    pub fn advance(self, to: Phase, degraded: bool) -> Result<RunState, TransitionError> {
        let error = || TransitionError {
            from: self.to_string(),
            to,
        };
        if self.is_failed() || self.phase().next() != Some(to) {
            return Err(error());
        }
        if degraded || self.is_degraded() {
            Ok(RunState::Degraded(to))
        } else {
            Ok(RunState::Active(to))
        }
    }

    /// Record a fatal failure. Not allowed once the run is terminal.
    pub fn fail(self) -> Result<RunState, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError {
                from: self.to_string(),
                to: self.phase(),
            });
        }
        Ok(RunState::Failed(self.phase()))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Active(p) => write!(f, "{}", p),
            RunState::Degraded(p) => write!(f, "DEGRADED ({})", p),
            RunState::Failed(p) => write!(f, "FAILED (after {})", p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: [Phase; 6] = [
        Phase::Probing,
        Phase::EnvReady,
        Phase::DepsValidated,
        Phase::ConfigChecked,
        Phase::SmokeTested,
        Phase::Reported,
    ];

    #[test]
    fn healthy_run_walks_every_phase() {
        let mut state = RunState::new();
        for phase in ORDER {
            state = state.advance(phase, false).unwrap();
        }
        assert_eq!(state, RunState::Active(Phase::Reported));
        assert!(state.is_terminal());
    }

    #[test]
    fn degradation_is_sticky() {
        let state = RunState::new()
            .advance(Phase::Probing, false)
            .unwrap()
            .advance(Phase::EnvReady, true)
            .unwrap()
            .advance(Phase::DepsValidated, false)
            .unwrap();
        assert_eq!(state, RunState::Degraded(Phase::DepsValidated));
        assert_eq!(state.to_string(), "DEGRADED (DEPS_VALIDATED)");
    }

    #[test]
    fn skipping_a_phase_is_rejected() {
        let err = RunState::new().advance(Phase::EnvReady, false).unwrap_err();
        assert_eq!(err.to, Phase::EnvReady);
        assert!(err.to_string().contains("STARTED"));
    }

    #[test]
    fn failed_is_terminal() {
        let state = RunState::new()
            .advance(Phase::Probing, false)
            .unwrap()
            .fail()
            .unwrap();
        assert_eq!(state, RunState::Failed(Phase::Probing));
        assert!(state.is_terminal());
        assert!(state.advance(Phase::EnvReady, false).is_err());
        assert!(state.fail().is_err());
        assert_eq!(state.to_string(), "FAILED (after PROBING)");
    }

    #[test]
    fn reported_cannot_fail() {
        let mut state = RunState::new();
        for phase in ORDER {
            state = state.advance(phase, false).unwrap();
        }
        assert!(state.fail().is_err());
    }

    #[test]
    fn phase_next_ends_at_reported() {
        assert_eq!(Phase::Started.next(), Some(Phase::Probing));
        assert_eq!(Phase::Reported.next(), None);
    }
}
