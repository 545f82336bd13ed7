//! Shared types for the storefront workspace.
//!
//! Typed identifiers keep product, user, cart, and order IDs from being
//! mixed up, and [`Money`] keeps every price in exact integer cents.

pub mod money;
pub mod types;

pub use money::{Money, ParseMoneyError};
pub use types::{CartId, OrderId, OwnerKey, ProductId, RequestContext, SessionId, UserId};
