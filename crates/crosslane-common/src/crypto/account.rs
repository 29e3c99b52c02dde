//! Keyed account identities
//!
//! Attestors and the registry owner are identified by their Ed25519 verifying
//! key. The printable form is the multicodec-prefixed key in base58btc, so an
//! identity pasted from a log line or a config file parses back to the same
//! key bytes.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::message::MessageId;

/// Ed25519 multicodec prefix
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Identity of a relay participant (attestor or registry owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// Build an identity from raw verifying-key bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw verifying-key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verifying key for signature checks
    pub fn verifying_key(&self) -> Result<VerifyingKey, IdentityError> {
        VerifyingKey::from_bytes(&self.0).map_err(|_| IdentityError::InvalidPublicKey)
    }
}

impl From<VerifyingKey> for AccountId {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefixed = Vec::with_capacity(34);
        prefixed.extend_from_slice(&ED25519_MULTICODEC);
        prefixed.extend_from_slice(&self.0);
        write!(f, "{}", bs58::encode(&prefixed).into_string())
    }
}

impl FromStr for AccountId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|_| IdentityError::InvalidEncoding)?;

        if decoded.len() != 34
            || decoded[0] != ED25519_MULTICODEC[0]
            || decoded[1] != ED25519_MULTICODEC[1]
        {
            return Err(IdentityError::InvalidMulticodec);
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&decoded[2..34]);
        Ok(Self(key))
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for AccountId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Signing keypair held by a relay participant
pub struct AccountKeypair {
    signing_key: SigningKey,
}

impl AccountKeypair {
    /// Generate a fresh keypair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a keypair from secret-key bytes
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Identity of this keypair
    pub fn id(&self) -> AccountId {
        AccountId(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign an endorsement over a message id
    pub fn endorse(&self, message_id: &MessageId) -> [u8; 64] {
        self.signing_key.sign(message_id.as_bytes()).to_bytes()
    }
}

/// Verify an endorsement of `message_id` against the claimed signer identity
pub fn verify_endorsement(
    signer: &AccountId,
    message_id: &MessageId,
    signature: &[u8; 64],
) -> Result<bool, IdentityError> {
    let key = signer.verifying_key()?;
    let sig = Signature::from_bytes(signature);
    Ok(key.verify(message_id.as_bytes(), &sig).is_ok())
}

/// Identity operation errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid identity encoding")]
    InvalidEncoding,

    #[error("Invalid multicodec prefix")]
    InvalidMulticodec,

    #[error("Invalid public key")]
    InvalidPublicKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_roundtrip() {
        let keypair = AccountKeypair::generate();
        let id = keypair.id();

        let printed = id.to_string();
        let parsed: AccountId = printed.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_endorse_and_verify() {
        let keypair = AccountKeypair::generate();
        let message_id = MessageId::from_bytes([3u8; 32]);

        let signature = keypair.endorse(&message_id);
        assert!(verify_endorsement(&keypair.id(), &message_id, &signature).unwrap());

        // Signature over a different message must not verify
        let other = MessageId::from_bytes([4u8; 32]);
        assert!(!verify_endorsement(&keypair.id(), &other, &signature).unwrap());
    }

    #[test]
    fn test_endorsement_binds_signer() {
        let signer = AccountKeypair::generate();
        let imposter = AccountKeypair::generate();
        let message_id = MessageId::from_bytes([9u8; 32]);

        let signature = signer.endorse(&message_id);
        assert!(!verify_endorsement(&imposter.id(), &message_id, &signature).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-base58-!!".parse::<AccountId>().is_err());

        // Valid base58 but missing the multicodec prefix
        let bare = bs58::encode([0u8; 32]).into_string();
        assert!(matches!(
            bare.parse::<AccountId>(),
            Err(IdentityError::InvalidMulticodec)
        ));
    }

    #[test]
    fn test_serde_uses_printable_form() {
        let id = AccountKeypair::generate().id();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));

        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
