// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Generic state machine types used to sequence a harness run. Transitions
//! are pure functions; the side effects (building, rendering, launching)
//! happen in the orchestrator between transitions.
//!
//! ```text
//! (State, Input) → (State, Output)
//! ```
//!
//! [`StateMachineWithHistory`] records each transition with a timestamp so a
//! run's report can show exactly how far it got.

pub mod launch_lifecycle;

pub use launch_lifecycle::{LaunchState, LaunchStep};

use serde::Serialize;

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Input not accepted in the current state
    #[error("Invalid transition from {from} on {input}")]
    InvalidTransition { from: String, input: String },

    /// State accepts no further input
    #[error("State {0} is terminal")]
    Terminal(String),
}

/// Trait for finite state machines
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    /// Get all valid inputs from current state (if enumerable)
    fn valid_inputs(&self) -> Vec<Self::Input>
    where
        Self::Input: Clone,
    {
        Vec::new()
    }
}

/// Transition metadata
#[derive(Debug, Clone, Serialize)]
pub struct Transition<S, I> {
    /// State before transition
    pub from: S,

    /// State after transition
    pub to: S,

    /// Input that triggered transition
    pub input: I,

    /// Timestamp of transition
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<S, I> Transition<S, I> {
    /// Create a new transition record
    pub fn new(from: S, to: S, input: I, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            from,
            to,
            input,
            timestamp,
        }
    }
}

/// State machine with history
#[derive(Debug, Clone)]
pub struct StateMachineWithHistory<FSM: StateMachine> {
    current: FSM,
    history: Vec<Transition<FSM, FSM::Input>>,
}

impl<FSM: StateMachine> StateMachineWithHistory<FSM> {
    /// Create a new state machine with history tracking
    pub fn new(initial: FSM) -> Self {
        Self {
            current: initial,
            history: Vec::new(),
        }
    }

    /// Transition with history recording
    ///
    /// A rejected input leaves both state and history untouched.
    pub fn transition_with_history(
        &mut self,
        input: FSM::Input,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> TransitionResult<FSM::Output> {
        let (to, output) = self.current.transition(&input)?;
        let from = std::mem::replace(&mut self.current, to.clone());

        self.history.push(Transition::new(from, to, input, timestamp));
        Ok(output)
    }

    /// Get transition history
    pub fn get_history(&self) -> &[Transition<FSM, FSM::Input>] {
        &self.history
    }

    /// Get current state
    pub fn current_state(&self) -> &FSM {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // Simple test FSM: On/Off switch with a fuse
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Switch {
        Off,
        On,
        Blown,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum SwitchInput {
        Press,
        Surge,
    }

    impl StateMachine for Switch {
        type Input = SwitchInput;
        type Output = ();

        fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
            match (self, input) {
                (Switch::Off, SwitchInput::Press) => Ok((Switch::On, ())),
                (Switch::On, SwitchInput::Press) => Ok((Switch::Off, ())),
                (Switch::On, SwitchInput::Surge) => Ok((Switch::Blown, ())),
                (Switch::Blown, _) => Err(TransitionError::Terminal("Blown".into())),
                (from, input) => Err(TransitionError::InvalidTransition {
                    from: format!("{from:?}"),
                    input: format!("{input:?}"),
                }),
            }
        }
    }

    #[test]
    fn test_history_records_transitions() {
        let mut fsm = StateMachineWithHistory::new(Switch::Off);

        fsm.transition_with_history(SwitchInput::Press, Utc::now())
            .unwrap();
        fsm.transition_with_history(SwitchInput::Surge, Utc::now())
            .unwrap();

        assert_eq!(*fsm.current_state(), Switch::Blown);
        let history = fsm.get_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].from, Switch::Off);
        assert_eq!(history[1].to, Switch::Blown);
    }

    #[test]
    fn test_rejected_input_leaves_state_untouched() {
        let mut fsm = StateMachineWithHistory::new(Switch::Off);

        let result = fsm.transition_with_history(SwitchInput::Surge, Utc::now());
        assert!(matches!(result, Err(TransitionError::InvalidTransition { .. })));
        assert_eq!(*fsm.current_state(), Switch::Off);
        assert!(fsm.get_history().is_empty());
        assert!(!Switch::Blown.can_transition(&SwitchInput::Press));
    }
}
