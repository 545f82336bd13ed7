//! Demo catalog and user seeding for local runs.

use chrono::Utc;
use common::{Money, ProductId, UserId};
use domain::{Product, ShippingAddress, User};
use store::{ProductStore, StoreError, UserStore};

/// Seeds a small demo catalog and one user with checkout details on
/// file, so a fresh in-memory server is usable end to end.
pub async fn seed_demo_data<S>(store: &S) -> Result<UserId, StoreError>
where
    S: ProductStore + UserStore,
{
    let products = [
        ("Polo Sporting Stretch Shirt", "polo-sporting-stretch-shirt", 59_99, 5),
        ("Brooks Brothers Long Sleeved Shirt", "brooks-brothers-long-sleeved-shirt", 85_90, 10),
        ("Tommy Hilfiger Classic Fit Dress Shirt", "tommy-hilfiger-classic-fit-dress-shirt", 99_95, 0),
        ("Calvin Klein Slim Fit Stretch Shirt", "calvin-klein-slim-fit-stretch-shirt", 39_95, 3),
    ];

    for (name, slug, price_cents, stock) in products {
        store
            .upsert_product(&Product {
                id: ProductId::new(),
                name: name.to_string(),
                slug: slug.to_string(),
                image: format!("/images/sample-products/{slug}.jpg"),
                price: Money::from_cents(price_cents),
                stock,
                created_at: Utc::now(),
            })
            .await?;
    }

    let user = User {
        id: UserId::new(),
        name: "Demo User".to_string(),
        email: "user@example.com".to_string(),
        address: Some(ShippingAddress {
            full_name: "Demo User".to_string(),
            street: "123 Main St".to_string(),
            city: "Anytown".to_string(),
            postal_code: "12345".to_string(),
            country: "USA".to_string(),
        }),
        payment_method: Some("PayPal".to_string()),
    };
    store.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "demo data seeded");
    Ok(user.id)
}
