//! Lifecycle transitions for status enums.

use super::DomainError;

/// A status enum with a fixed transition table.
///
/// Aggregates move between statuses only through [`transition_to`], so a
/// request that arrives out of order fails as a conflict instead of
/// silently rewriting history.
///
/// [`transition_to`]: StateMachine::transition_to
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    /// Statuses reachable in one step.
    fn valid_transitions(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn transition_to(&self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        Err(DomainError::invalid_transition(format!(
            "Cannot move from {:?} to {:?}",
            self, target
        )))
    }

    /// No outgoing transitions.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
