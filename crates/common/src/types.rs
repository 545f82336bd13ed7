use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a catalog product.
    ProductId
);

uuid_id!(
    /// Unique identifier for a registered user.
    UserId
);

uuid_id!(
    /// Unique identifier for a cart.
    CartId
);

uuid_id!(
    /// Unique identifier for an order.
    OrderId
);

uuid_id!(
    /// Anonymous session identifier issued by the session cookie.
    SessionId
);

/// The key a cart is owned by: a signed-in user or an anonymous session.
///
/// Exactly one of the two identifies a cart at any time. A cart created
/// under a session key is looked up by user key after sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKey {
    /// Cart owned by a signed-in user.
    User(UserId),
    /// Cart owned by an anonymous session.
    Session(SessionId),
}

impl std::fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerKey::User(id) => write!(f, "user:{id}"),
            OwnerKey::Session(id) => write!(f, "session:{id}"),
        }
    }
}

/// Identity context resolved by the external identity provider and passed
/// explicitly into every core operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    /// The signed-in user, if any.
    pub user_id: Option<UserId>,
    /// The anonymous session cart id from the session cookie, if any.
    pub session_id: Option<SessionId>,
}

impl RequestContext {
    /// Context for a signed-in user with a session cookie.
    pub fn signed_in(user_id: UserId, session_id: SessionId) -> Self {
        Self {
            user_id: Some(user_id),
            session_id: Some(session_id),
        }
    }

    /// Context for an anonymous session.
    pub fn anonymous(session_id: SessionId) -> Self {
        Self {
            user_id: None,
            session_id: Some(session_id),
        }
    }

    /// Returns the cart owner key, preferring the user over the session.
    pub fn owner_key(&self) -> Option<OwnerKey> {
        self.user_id
            .map(OwnerKey::User)
            .or(self.session_id.map(OwnerKey::Session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(ProductId::new(), ProductId::new());
        assert_ne!(OrderId::new(), OrderId::new());
    }

    #[test]
    fn id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = CartId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn id_serialization_roundtrip() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn owner_key_prefers_user() {
        let user_id = UserId::new();
        let session_id = SessionId::new();
        let ctx = RequestContext::signed_in(user_id, session_id);
        assert_eq!(ctx.owner_key(), Some(OwnerKey::User(user_id)));
    }

    #[test]
    fn owner_key_falls_back_to_session() {
        let session_id = SessionId::new();
        let ctx = RequestContext::anonymous(session_id);
        assert_eq!(ctx.owner_key(), Some(OwnerKey::Session(session_id)));
    }

    #[test]
    fn owner_key_absent_without_identity() {
        let ctx = RequestContext::default();
        assert!(ctx.owner_key().is_none());
    }
}
