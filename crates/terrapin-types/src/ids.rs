//! typed identifiers for the relational state.
//!
//! numeric ids are newtypes over `i64` (matching the database primary keys),
//! agent and tenant ids are opaque strings minted by the platform.

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

numeric_id!(
    /// identifier for a deployment site.
    SiteId
);
numeric_id!(
    /// identifier for a routable resource.
    ResourceId
);
numeric_id!(
    /// identifier for an upstream target of a resource.
    TargetId
);
numeric_id!(
    /// identifier for a logical client owned by an olm.
    ClientId
);
numeric_id!(
    /// identifier for an exit node attached to sites.
    ExitNodeId
);

string_id!(
    /// identifier for a tenant org.
    OrgId
);
string_id!(
    /// identifier for a newt agent.
    NewtId
);
string_id!(
    /// identifier for an olm agent.
    OlmId
);
string_id!(
    /// identifier for a platform user.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_display() {
        assert_eq!(SiteId(42).to_string(), "42");
        assert_eq!(TargetId(7).to_string(), "7");
    }

    #[test]
    fn string_id_from_str() {
        let id = NewtId::from("newt-abc");
        assert_eq!(id.as_str(), "newt-abc");
        assert_eq!(id.to_string(), "newt-abc");
    }

    #[test]
    fn ids_are_comparable_and_hashable() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        seen.insert(SiteId(1));
        seen.insert(SiteId(1));
        seen.insert(SiteId(2));
        assert_eq!(seen.len(), 2);
    }
}
