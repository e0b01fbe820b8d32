// Copyright (c) 2025 - Cowboy AI, Inc.
//! Launch Lifecycle State Machine
//!
//! Sequencing of one harness run.
//!
//! # States
//!
//! ```text
//! Idle → BuildingBinaries → Phase1 → Phase2 → Phase3 → Barrier → Phase4 → Done
//!   └──────────────┴────────────┴────────┴────────┴────────┴────────┴──→ Aborted
//! ```
//!
//! Phases 1-4 launch PLN, PGN, MS and SIG instances respectively. `Done` and
//! `Aborted` are terminal, so a finished run cannot be replayed against the
//! same allocator.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::ServiceKind;

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaunchState {
    Idle,
    BuildingBinaries,
    Phase1,
    Phase2,
    Phase3,
    Barrier,
    Phase4,
    Done,
    Aborted,
}

/// Run step (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaunchStep {
    /// Invoke the external build
    StartBuild,
    /// Build returned successfully
    BuildFinished,
    /// Every instance of the current phase had its launch call issued
    PhaseFinished,
    /// Barrier wait returned
    BarrierReleased,
    /// Fatal error
    Abort,
}

impl LaunchState {
    /// Service kind launched in this state, if it is a phase
    pub fn service_kind(&self) -> Option<ServiceKind> {
        match self {
            Self::Phase1 => Some(ServiceKind::Pln),
            Self::Phase2 => Some(ServiceKind::Pgn),
            Self::Phase3 => Some(ServiceKind::Ms),
            Self::Phase4 => Some(ServiceKind::Sig),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for LaunchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl StateMachine for LaunchState {
    type Input = LaunchStep;
    type Output = ();

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use LaunchState::*;
        use LaunchStep::*;

        let next = match (self, input) {
            (Done | Aborted, _) => return Err(TransitionError::Terminal(self.to_string())),
            (_, Abort) => Aborted,

            (Idle, StartBuild) => BuildingBinaries,
            (BuildingBinaries, BuildFinished) => Phase1,
            (Phase1, PhaseFinished) => Phase2,
            (Phase2, PhaseFinished) => Phase3,
            (Phase3, PhaseFinished) => Barrier,
            (Barrier, BarrierReleased) => Phase4,
            (Phase4, PhaseFinished) => Done,

            (from, input) => {
                return Err(TransitionError::InvalidTransition {
                    from: from.to_string(),
                    input: input.to_string(),
                })
            }
        };

        Ok((next, ()))
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use LaunchState::*;
        use LaunchStep::*;

        match self {
            Idle => vec![StartBuild, Abort],
            BuildingBinaries => vec![BuildFinished, Abort],
            Phase1 | Phase2 | Phase3 | Phase4 => vec![PhaseFinished, Abort],
            Barrier => vec![BarrierReleased, Abort],
            Done | Aborted => vec![],
        }
    }
}
