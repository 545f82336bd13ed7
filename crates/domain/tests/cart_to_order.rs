//! End-to-end domain flow: cart mutations through assembly to fulfillment.

use chrono::Utc;
use common::{Money, OwnerKey, ProductId, SessionId, UserId};
use domain::{
    AssemblyError, Cart, CartItem, CartItemInput, FulfillmentError, FulfillmentState,
    ShippingAddress, User, Validation, assemble_order, validate_cart_item, validate_order,
};

fn snapshot(product_id: ProductId, name: &str, price_cents: i64) -> CartItem {
    CartItem {
        product_id,
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        image: format!("/images/{}.jpg", name.to_lowercase().replace(' ', "-")),
        price: Money::from_cents(price_cents),
        qty: 1,
    }
}

fn user_with_everything() -> User {
    User {
        id: UserId::new(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        address: Some(ShippingAddress {
            full_name: "Ada Lovelace".to_string(),
            street: "1 Analytical Way".to_string(),
            city: "London".to_string(),
            postal_code: "N1 9GU".to_string(),
            country: "GB".to_string(),
        }),
        payment_method: Some("PayPal".to_string()),
    }
}

#[test]
fn session_cart_to_delivered_order() {
    let user = user_with_everything();
    let session_id = SessionId::new();

    // Anonymous browsing: cart starts under the session key.
    let mut cart = Cart::new(OwnerKey::Session(session_id), Utc::now());
    let widget = ProductId::new();
    let gadget = ProductId::new();

    cart.add_unit(snapshot(widget, "Widget", 45_00));
    cart.add_unit(snapshot(widget, "Widget", 45_00));
    cart.add_unit(snapshot(gadget, "Gadget", 12_50));

    assert_eq!(cart.items().len(), 2);
    assert_eq!(cart.quantity_of(widget), 2);
    assert_eq!(cart.totals().items_price, Money::from_cents(102_50));
    // Over the threshold: free shipping.
    assert_eq!(cart.totals().shipping_price, Money::zero());
    assert!(cart.totals().balances());

    // Sign-in rebinds the cart to the user.
    cart.rebind_owner(OwnerKey::User(user.id));
    assert_eq!(cart.owner(), OwnerKey::User(user.id));

    // Checkout snapshot.
    let mut order = assemble_order(&cart, &user, Utc::now()).unwrap();
    assert_eq!(validate_order(&order), Validation::Valid(()));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items_price, cart.totals().items_price);
    assert_eq!(order.state(), FulfillmentState::Created);

    // Later catalog price changes must not touch the snapshot.
    let frozen_price = order.items[0].price;
    assert_eq!(frozen_price, Money::from_cents(45_00));

    // Fulfillment.
    order.mark_paid(Utc::now()).unwrap();
    assert_eq!(order.state(), FulfillmentState::Paid);
    order.mark_delivered(Utc::now()).unwrap();
    assert_eq!(order.state(), FulfillmentState::Delivered);
}

#[test]
fn lifecycle_guards_hold_across_the_flow() {
    let user = user_with_everything();
    let mut cart = Cart::new(OwnerKey::User(user.id), Utc::now());
    cart.add_unit(snapshot(ProductId::new(), "Widget", 30_00));

    let mut order = assemble_order(&cart, &user, Utc::now()).unwrap();

    assert_eq!(
        order.mark_delivered(Utc::now()),
        Err(FulfillmentError::NotPaid)
    );
    order.mark_paid(Utc::now()).unwrap();
    assert_eq!(order.mark_paid(Utc::now()), Err(FulfillmentError::AlreadyPaid));
    order.mark_delivered(Utc::now()).unwrap();
    assert_eq!(
        order.mark_delivered(Utc::now()),
        Err(FulfillmentError::AlreadyDelivered)
    );
}

#[test]
fn assembly_preconditions_checked_in_page_order() {
    let mut user = user_with_everything();
    let cart = Cart::new(OwnerKey::User(user.id), Utc::now());

    // Address is checked before payment method, both before the cart.
    user.address = None;
    user.payment_method = None;
    assert_eq!(
        assemble_order(&cart, &user, Utc::now()),
        Err(AssemblyError::MissingAddress)
    );

    user.address = Some(ShippingAddress {
        full_name: "Ada Lovelace".to_string(),
        street: "1 Analytical Way".to_string(),
        city: "London".to_string(),
        postal_code: "N1 9GU".to_string(),
        country: "GB".to_string(),
    });
    assert_eq!(
        assemble_order(&cart, &user, Utc::now()),
        Err(AssemblyError::MissingPaymentMethod)
    );

    user.payment_method = Some("PayPal".to_string());
    assert_eq!(
        assemble_order(&cart, &user, Utc::now()),
        Err(AssemblyError::EmptyCart)
    );
}

#[test]
fn validated_input_flows_into_cart() {
    let product_id = ProductId::new();
    let input = CartItemInput {
        product_id,
        name: "Widget".to_string(),
        slug: "widget".to_string(),
        image: "/images/widget.jpg".to_string(),
        price: "19.99".parse().unwrap(),
        qty: 1,
    };

    let Validation::Valid(item) = validate_cart_item(input) else {
        panic!("expected valid input");
    };

    let mut cart = Cart::new(OwnerKey::Session(SessionId::new()), Utc::now());
    cart.add_unit(item);

    assert_eq!(cart.totals().items_price.to_string(), "19.99");
    assert_eq!(cart.totals().shipping_price.to_string(), "10.00");
    assert_eq!(cart.totals().tax_price.to_string(), "3.00");
    assert_eq!(cart.totals().total_price.to_string(), "32.99");
}
