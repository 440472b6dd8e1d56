//! Digest helpers behind element fingerprints.

use sha1::Sha1;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Namespace for table identifiers (UUID v5 over the canonical table layout).
pub const TABLE_NAMESPACE: Uuid = Uuid::from_u128(0x6f3c_2a1e_9b7d_4c55_8e0a_d41b_77c2_9f13);

pub fn sha1_hex(s: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Name-based identifier in `namespace`, 122 random-looking bits.
pub fn namespaced_id(namespace: &Uuid, name: &str) -> Uuid {
    Uuid::new_v5(namespace, name.as_bytes())
}
