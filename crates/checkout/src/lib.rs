pub mod cart_service;
pub mod coordinator;
pub mod error;
pub mod notify;

pub use cart_service::{ActionOutcome, CartService};
pub use coordinator::{CheckoutCoordinator, PlaceOrderOutcome};
pub use error::{CheckoutError, Result};
pub use notify::{InMemoryNotificationService, NotificationService, NotifyError};
