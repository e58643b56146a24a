// file: src/utils/crypto.rs
// version: 2.0.0
// guid: w4x5y6z7-a8b9-0123-4567-890123456789

use rand::distributions::{Alphanumeric, DistString};

/// Cryptographic helpers for tenant credentials
pub struct CryptoUtils;

impl CryptoUtils {
    /// Generate a random alphanumeric password.
    ///
    /// Alphanumeric output is safe to embed in single-quoted config literals
    /// and in URL-encoded panel requests without further escaping.
    pub fn generate_password(length: usize) -> String {
        Alphanumeric.sample_string(&mut rand::thread_rng(), length)
    }
}
