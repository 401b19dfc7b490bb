use crate::errors::CipherError;

/// Keyed deterministic encryption: equal plaintexts seal to equal
/// ciphertexts under the same key, so sealed values can be unique-indexed
/// and looked up without decrypting the table.
///
/// Key management and rotation belong to the embedding application.
pub trait DeterministicCipher: Send + Sync {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Inverse of `seal`. Fails on tampered input or a different key.
    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CipherError>;
}
