//! two-step stop confirmation.
//!
//! Idle -> request_stop -> Confirming -> confirm -> Terminated
//!                         Confirming -> cancel  -> Idle
//!
//! Terminated is final for the life of the process.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationState {
    #[default]
    Idle,
    Confirming,
    Terminated,
}

impl TerminationState {
    /// stop button pressed; opens the confirmation prompt
    pub fn request_stop(&mut self) -> Self {
        if *self == Self::Idle {
            *self = Self::Confirming;
        }
        *self
    }

    /// user answered yes
    pub fn confirm(&mut self) -> Self {
        if *self == Self::Confirming {
            *self = Self::Terminated;
        }
        *self
    }

    /// user answered no or dismissed the prompt
    pub fn cancel(&mut self) -> Self {
        if *self == Self::Confirming {
            *self = Self::Idle;
        }
        *self
    }

    pub fn is_terminated(&self) -> bool {
        *self == Self::Terminated
    }

    pub fn dialog_displayed(&self) -> bool {
        *self == Self::Confirming
    }
}
