//! User record as supplied by the identity collaborator.

use common::UserId;
use serde::{Deserialize, Serialize};

/// A shipping address on file for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient full name.
    pub full_name: String,
    /// Street address line.
    pub street: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
}

/// A registered user, read-only to this core.
///
/// Checkout requires both `address` and `payment_method` to be on file;
/// either missing redirects the user to the page that can fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, used for receipts.
    pub email: String,
    /// Shipping address, if one has been saved.
    pub address: Option<ShippingAddress>,
    /// Preferred payment method, if one has been saved.
    pub payment_method: Option<String>,
}
