//! Connection state machine

use crate::{Error, Result};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial state (not connected)
    Initial,

    /// Transport established, bind not yet performed
    Connected,

    /// Bound (or anonymous), ready to issue a search
    Ready,

    /// One search outstanding, results draining
    Searching,

    /// Closed
    Closed,
}

impl ConnectionState {
    /// Check if transition is valid
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        matches!(
            (self, next),
            (Initial, Connected)
                | (Connected, Ready)
                | (Ready, Searching)
                | (Searching, Ready)
                | (_, Closed)
        )
    }

    /// Transition to new state
    pub fn transition(&mut self, next: ConnectionState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(Error::InvalidState {
                expected: format!("valid transition from {:?}", self),
                actual: format!("{:?}", next),
            });
        }
        *self = next;
        Ok(())
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Connected => write!(f, "connected"),
            Self::Ready => write!(f, "ready"),
            Self::Searching => write!(f, "searching"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        let mut state = ConnectionState::Initial;
        assert!(state.transition(ConnectionState::Connected).is_ok());
        assert!(state.transition(ConnectionState::Ready).is_ok());
        assert!(state.transition(ConnectionState::Searching).is_ok());
    }

    #[test]
    fn test_invalid_transition() {
        let mut state = ConnectionState::Initial;
        assert!(state.transition(ConnectionState::Searching).is_err());
    }

    #[test]
    fn test_close_from_any_state() {
        let mut state = ConnectionState::Searching;
        assert!(state.transition(ConnectionState::Closed).is_ok());
    }

    #[test]
    fn test_search_completion_returns_to_ready() {
        let mut state = ConnectionState::Searching;
        assert!(state.transition(ConnectionState::Ready).is_ok());
    }

    #[test]
    fn test_no_second_search_while_draining() {
        // At most one outstanding search per connection
        let state = ConnectionState::Searching;
        assert!(!state.can_transition_to(ConnectionState::Searching));
    }

    #[test]
    fn test_closed_is_terminal_except_close() {
        let state = ConnectionState::Closed;
        assert!(!state.can_transition_to(ConnectionState::Ready));
        assert!(!state.can_transition_to(ConnectionState::Connected));
    }
}
