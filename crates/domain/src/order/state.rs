//! Order fulfillment state machine.

use serde::{Deserialize, Serialize};

/// The fulfillment state of an order.
///
/// Transitions are one-directional:
/// ```text
/// Created ──► Paid ──► Delivered
/// ```
/// There is no cancellation state; order deletion is an administrative
/// escape hatch outside the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FulfillmentState {
    /// Order exists, payment pending.
    #[default]
    Created,
    /// Payment confirmed, stock settled.
    Paid,
    /// Handed to the customer (terminal state).
    Delivered,
}

impl FulfillmentState {
    /// Derives the state from the two persisted lifecycle flags.
    pub fn from_flags(is_paid: bool, is_delivered: bool) -> Self {
        match (is_paid, is_delivered) {
            (_, true) => FulfillmentState::Delivered,
            (true, false) => FulfillmentState::Paid,
            (false, false) => FulfillmentState::Created,
        }
    }

    /// Returns true if the order can be marked paid in this state.
    pub fn can_pay(&self) -> bool {
        matches!(self, FulfillmentState::Created)
    }

    /// Returns true if the order can be marked delivered in this state.
    pub fn can_deliver(&self) -> bool {
        matches!(self, FulfillmentState::Paid)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FulfillmentState::Delivered)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentState::Created => "Created",
            FulfillmentState::Paid => "Paid",
            FulfillmentState::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for FulfillmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
