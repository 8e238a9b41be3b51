//! Controller load state and its transition table.

use std::fmt;

/// Where the controller is in a consent flow.
///
/// At most one flow is outstanding: a load only starts from `Ready`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// Idle; a new load may start
    #[default]
    Ready,
    /// A message fetch or privacy manager load is in progress
    Loading,
    /// A consent UI is on screen
    Presenting,
}

/// Events that move the controller between [`LoadState`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// `load_message` or `load_privacy_manager` was called
    BeginLoad,
    /// A message URL arrived or the UI reported it is about to show
    PresentUi,
    /// The service resolved consent without needing a UI
    Resolve,
    /// The UI was closed
    Dismiss,
    /// Any error from the client or the UI
    Fail,
}

impl LoadState {
    /// Next state for `transition`, or `None` when it is not allowed from here.
    pub fn apply(self, transition: Transition) -> Option<LoadState> {
        use LoadState::*;
        use Transition::*;

        match (self, transition) {
            (Ready, BeginLoad) => Some(Loading),
            (Loading | Presenting, PresentUi) => Some(Presenting),
            (Loading, Resolve) => Some(Ready),
            (_, Dismiss) | (_, Fail) => Some(Ready),
            _ => None,
        }
    }

    pub fn is_busy(self) -> bool {
        self != LoadState::Ready
    }
}

impl Transition {
    /// Transitions that start a new generation and invalidate in-flight results.
    pub fn starts_new_generation(self) -> bool {
        matches!(self, Transition::BeginLoad | Transition::Fail)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Ready => write!(f, "Ready"),
            LoadState::Loading => write!(f, "Loading"),
            LoadState::Presenting => write!(f, "Presenting"),
        }
    }
}
