pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use repository::{
    CartStore, CheckoutStore, CheckoutTx, OrderStore, ProductStore, StorefrontStore, UserStore,
};
