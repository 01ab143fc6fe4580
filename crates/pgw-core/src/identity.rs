//! # Identifier Newtypes
//!
//! UUID-backed identifiers for registry records, plus the 32-byte payment
//! identifier used by the gateway contract. Distinct types keep a policy id
//! from being passed where a chain id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hex::{self, HexError};

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

uuid_newtype!(
    /// Internal identifier of a chain registry record.
    ChainRecordId,
    "chain"
);
uuid_newtype!(
    /// Identifier of a stored route policy.
    PolicyId,
    "policy"
);
uuid_newtype!(
    /// Identifier of a stored per-protocol bridge configuration.
    BridgeConfigId,
    "bridge-config"
);
uuid_newtype!(
    /// Identifier of a smart contract registry record.
    ContractId,
    "contract"
);

/// Payment identifier as recorded by the gateway contract (`bytes32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentId([u8; 32]);

impl PaymentId {
    /// Parse a `0x`-prefixed (or bare) 64-hex-character payment id.
    ///
    /// # Errors
    ///
    /// Returns [`HexError`] for non-hex input or any length other than 32 bytes.
    pub fn from_hex(input: &str) -> Result<Self, HexError> {
        let bytes = hex::decode_hex(input)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| HexError::WrongLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Canonical `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode_hex(&self.0)
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PaymentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PaymentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_unique() {
        assert_ne!(PolicyId::new(), PolicyId::new());
    }

    #[test]
    fn display_carries_namespace() {
        let id = ChainRecordId::from_uuid(Uuid::nil());
        assert_eq!(
            id.to_string(),
            "chain:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn ids_serialize_as_bare_uuid() {
        let id = ContractId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn payment_id_roundtrips_hex() {
        let hex = format!("0x{}", "ab".repeat(32));
        let id = PaymentId::from_hex(&hex).unwrap();
        assert_eq!(id.to_hex(), hex);
        assert_eq!(id.as_bytes()[0], 0xab);
    }

    #[test]
    fn payment_id_accepts_bare_hex() {
        let id = PaymentId::from_hex(&"01".repeat(32)).unwrap();
        assert_eq!(id.as_bytes()[31], 1);
    }

    #[test]
    fn payment_id_rejects_short_input() {
        let err = PaymentId::from_hex("0x1234").unwrap_err();
        assert_eq!(
            err,
            HexError::WrongLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn payment_id_serde_uses_hex_string() {
        let id = PaymentId::from_bytes([7u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        let back: PaymentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
