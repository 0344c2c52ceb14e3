//! State machine trait for status enums.
//!
//! Provides a consistent interface for reasoning about transitions of labels
//! the external store keeps per subject (pallet state, for example).

/// Trait for status enums that represent state machines.
///
/// Implementors list the direct transitions out of each state and get
/// reachability and terminal checks for free.
///
/// # Example
///
/// ```ignore
/// assert!(PalletState::Armado.can_reach(&PalletState::EnTransito));
/// assert!(PalletState::Entregado.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if `target` is self or lies on some forward path from self.
    fn can_reach(&self, target: &Self) -> bool {
        let mut frontier = vec![*self];
        let mut seen: Vec<Self> = Vec::new();
        while let Some(state) = frontier.pop() {
            if state == *target {
                return true;
            }
            if seen.contains(&state) {
                continue;
            }
            seen.push(state);
            frontier.extend(state.valid_transitions());
        }
        false
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStatus {
        Open,
        Sealed,
        Shipped,
        Reopened,
    }

    impl StateMachine for TestStatus {
        fn valid_transitions(&self) -> Vec<Self> {
            use TestStatus::*;
            match self {
                Open => vec![Sealed],
                Sealed => vec![Shipped, Reopened],
                Reopened => vec![Sealed],
                Shipped => vec![],
            }
        }
    }

    #[test]
    fn direct_transitions_come_from_the_table() {
        assert_eq!(TestStatus::Open.valid_transitions(), vec![TestStatus::Sealed]);
        assert!(TestStatus::Shipped.valid_transitions().is_empty());
    }

    #[test]
    fn can_reach_follows_forward_paths() {
        assert!(TestStatus::Open.can_reach(&TestStatus::Shipped));
        assert!(TestStatus::Open.can_reach(&TestStatus::Open));
        assert!(!TestStatus::Shipped.can_reach(&TestStatus::Open));
    }

    #[test]
    fn can_reach_terminates_on_cycles() {
        assert!(TestStatus::Reopened.can_reach(&TestStatus::Shipped));
        assert!(!TestStatus::Reopened.can_reach(&TestStatus::Open));
    }

    #[test]
    fn is_terminal_only_for_states_without_exits() {
        assert!(TestStatus::Shipped.is_terminal());
        assert!(!TestStatus::Open.is_terminal());
        assert!(!TestStatus::Sealed.is_terminal());
    }
}
