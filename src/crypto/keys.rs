// Ed25519 keys, signatures and addresses

use ed25519_dalek::{Signer, Verifier};
use rand::rngs::OsRng;
use std::fmt;

/// Private key (seed) length in bytes
pub const PRIV_KEY_LEN: usize = 32;
/// Public key length in bytes
pub const PUB_KEY_LEN: usize = 32;
/// Signature length in bytes
pub const SIGNATURE_LEN: usize = 64;
/// Address length in bytes
pub const ADDRESS_LEN: usize = 20;

/// Ed25519 private key
#[derive(Clone)]
pub struct PrivateKey {
    key: ed25519_dalek::SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key
    pub fn generate() -> Self {
        Self {
            key: ed25519_dalek::SigningKey::generate(&mut OsRng),
        }
    }

    /// Derive a private key from a 32-byte seed
    pub fn from_seed(seed: &[u8; PRIV_KEY_LEN]) -> Self {
        Self {
            key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Derive a private key from a hex-encoded seed string
    pub fn from_seed_hex(seed: &str) -> Result<Self, String> {
        let bytes = hex::decode(seed).map_err(|e| format!("Invalid seed hex: {}", e))?;
        if bytes.len() != PRIV_KEY_LEN {
            return Err(format!(
                "Invalid seed length: expected {}, got {}",
                PRIV_KEY_LEN,
                bytes.len()
            ));
        }
        let mut seed_bytes = [0u8; PRIV_KEY_LEN];
        seed_bytes.copy_from_slice(&bytes);
        Ok(Self::from_seed(&seed_bytes))
    }

    /// Sign a message
    pub fn sign(&self, msg: &[u8]) -> Signature {
        Signature {
            sig: self.key.sign(msg),
        }
    }

    /// Get the corresponding public key
    pub fn public(&self) -> PublicKey {
        PublicKey {
            key: self.key.verifying_key(),
        }
    }

    /// Get the seed bytes
    pub fn to_bytes(&self) -> [u8; PRIV_KEY_LEN] {
        self.key.to_bytes()
    }
}

/// Ed25519 public key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    key: ed25519_dalek::VerifyingKey,
}

impl PublicKey {
    /// Create a public key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() != PUB_KEY_LEN {
            return Err(format!(
                "Invalid public key length: expected {}, got {}",
                PUB_KEY_LEN,
                bytes.len()
            ));
        }
        let mut key_bytes = [0u8; PUB_KEY_LEN];
        key_bytes.copy_from_slice(bytes);
        let key = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| format!("Invalid public key: {}", e))?;
        Ok(Self { key })
    }

    /// Get the key bytes
    pub fn to_bytes(&self) -> [u8; PUB_KEY_LEN] {
        self.key.to_bytes()
    }

    /// Derive the address: the trailing 20 bytes of the public key
    pub fn address(&self) -> Address {
        let bytes = self.key.to_bytes();
        let mut addr = [0u8; ADDRESS_LEN];
        addr.copy_from_slice(&bytes[PUB_KEY_LEN - ADDRESS_LEN..]);
        Address(addr)
    }
}

/// Ed25519 signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    sig: ed25519_dalek::Signature,
}

impl Signature {
    /// Create a signature from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let sig = ed25519_dalek::Signature::from_slice(bytes)
            .map_err(|e| format!("Invalid signature: {}", e))?;
        Ok(Self { sig })
    }

    /// Get the signature bytes
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.sig.to_bytes()
    }

    /// Verify this signature over a message against a public key
    pub fn verify(&self, pub_key: &PublicKey, msg: &[u8]) -> bool {
        pub_key.key.verify(msg, &self.sig).is_ok()
    }
}

/// Value-owner address - trailing 20 bytes of a public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Create an address from a slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, String> {
        if slice.len() != ADDRESS_LEN {
            return Err(format!(
                "Invalid address length: expected {}, got {}",
                ADDRESS_LEN,
                slice.len()
            ));
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the address bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
