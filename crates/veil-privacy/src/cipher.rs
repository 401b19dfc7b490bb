//! Deterministic authenticated encryption (synthetic IV construction).
//!
//! - **Nonce**: first 12 bytes of a keyed BLAKE3 hash of the plaintext
//! - **Encryption**: ChaCha20-Poly1305
//! - **Layout**: `nonce (12) || ciphertext || tag (16)`
//!
//! Equal plaintexts under one key produce equal sealed bytes, which is what
//! lets the mapping store put a unique index on sealed keys. The only thing
//! leaked is equality of plaintexts.

use std::fmt;

use chacha20poly1305::{aead::Aead, ChaCha20Poly1305, Key, KeyInit, Nonce};

use veil_core::errors::CipherError;
use veil_core::traits::DeterministicCipher;

/// Master key length.
pub const KEY_LEN: usize = 32;
/// ChaCha20-Poly1305 nonce length.
pub const NONCE_LEN: usize = 12;
/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

const ENCRYPTION_CONTEXT: &str = "veil mapping-store 2024 chacha20poly1305 encryption key";
const NONCE_CONTEXT: &str = "veil mapping-store 2024 synthetic nonce key";

pub struct SivCipher {
    aead: ChaCha20Poly1305,
    nonce_key: [u8; KEY_LEN],
}

impl SivCipher {
    /// Derive the encryption and nonce subkeys from a 32-byte master key.
    pub fn new(master_key: [u8; KEY_LEN]) -> Self {
        let encryption_key = blake3::derive_key(ENCRYPTION_CONTEXT, &master_key);
        let nonce_key = blake3::derive_key(NONCE_CONTEXT, &master_key);
        Self {
            aead: ChaCha20Poly1305::new(Key::from_slice(&encryption_key)),
            nonce_key,
        }
    }

    pub fn from_slice(master_key: &[u8]) -> Result<Self, CipherError> {
        let key: [u8; KEY_LEN] = master_key.try_into().map_err(|_| CipherError::InvalidKey {
            reason: format!("expected {KEY_LEN} bytes, got {}", master_key.len()),
        })?;
        Ok(Self::new(key))
    }

    fn synthetic_nonce(&self, plaintext: &[u8]) -> [u8; NONCE_LEN] {
        let hash = blake3::keyed_hash(&self.nonce_key, plaintext);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&hash.as_bytes()[..NONCE_LEN]);
        nonce
    }
}

impl fmt::Debug for SivCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SivCipher").finish_non_exhaustive()
    }
}

impl DeterministicCipher for SivCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let nonce = self.synthetic_nonce(plaintext);
        let ciphertext = self
            .aead
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CipherError::Seal {
                message: e.to_string(),
            })?;
        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CipherError> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Open {
                message: format!("sealed value too short ({} bytes)", sealed.len()),
            });
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .aead
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Open {
                message: "authentication failed (wrong key or tampered value)".to_string(),
            })?;
        if self.synthetic_nonce(&plaintext) != nonce {
            return Err(CipherError::Open {
                message: "synthetic nonce does not match plaintext".to_string(),
            });
        }
        Ok(plaintext)
    }
}
