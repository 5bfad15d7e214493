//! Opaque ID newtypes for netlist entities.
//!
//! [`InstanceId`] and [`NetworkId`] are thin `u32` wrappers used as indices
//! into the netlist's instance and network tables. They are `Copy`, `Hash`,
//! and `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug,
            Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for an instance in the netlist.
    InstanceId
);

define_id!(
    /// Opaque, copyable ID for a network in the netlist.
    NetworkId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn roundtrip() {
        let id = InstanceId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        let id = NetworkId::from_raw(7);
        assert_eq!(id.as_raw(), 7);
    }

    #[test]
    fn equality_and_ordering() {
        let a = InstanceId::from_raw(3);
        let b = InstanceId::from_raw(3);
        let c = InstanceId::from_raw(4);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn hash_in_set() {
        let mut set = HashSet::new();
        set.insert(NetworkId::from_raw(1));
        set.insert(NetworkId::from_raw(2));
        set.insert(NetworkId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", InstanceId::from_raw(12)), "12");
    }

    #[test]
    fn serde_roundtrip() {
        let id = NetworkId::from_raw(55);
        let json = serde_json::to_string(&id).unwrap();
        let back: NetworkId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
