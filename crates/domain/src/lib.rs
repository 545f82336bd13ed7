//! Domain layer for the storefront: cart aggregate and pricing, catalog
//! product and stock guard, order assembly, and the fulfillment state
//! machine.
//!
//! Everything here is pure and synchronous; persistence and transaction
//! semantics live in the `store` crate, orchestration in `checkout`.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;
pub mod validate;

pub use cart::{Cart, CartError, CartItem, CartTotals, RemovedItem, derive_prices};
pub use order::{
    AssemblyError, FulfillmentError, FulfillmentState, Order, OrderItem, assemble_order,
};
pub use product::{Product, stock_available};
pub use user::{ShippingAddress, User};
pub use validate::{CartItemInput, Validation, validate_cart_item, validate_order};
