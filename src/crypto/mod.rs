// Key material and signatures

mod keys;

pub use keys::{Address, PrivateKey, PublicKey, Signature};
pub use keys::{ADDRESS_LEN, PRIV_KEY_LEN, PUB_KEY_LEN, SIGNATURE_LEN};
