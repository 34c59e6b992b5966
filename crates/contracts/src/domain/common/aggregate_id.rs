use serde::{de::DeserializeOwned, Serialize};
use std::hash::Hash;

/// Identifier type of an aggregate
pub trait AggregateId:
    Clone + Copy + PartialEq + Eq + Hash + Serialize + DeserializeOwned + std::fmt::Debug
{
    fn as_string(&self) -> String;

    fn from_string(s: &str) -> Result<Self, String>;
}

impl AggregateId for uuid::Uuid {
    fn as_string(&self) -> String {
        ToString::to_string(self)
    }

    fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s).map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Declares a uuid-backed id newtype with the usual helpers.
#[macro_export]
macro_rules! uuid_aggregate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new(value: uuid::Uuid) -> Self {
                Self(value)
            }

            pub fn new_v4() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub fn value(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl $crate::domain::common::AggregateId for $name {
            fn as_string(&self) -> String {
                self.0.to_string()
            }

            fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map($name::new)
                    .map_err(|e| format!("Invalid UUID: {}", e))
            }
        }
    };
}
