//! Pseudo-names drawn from a fixed pool.
//!
//! The starting slot is a BLAKE3 hash of the canonical key, so the same
//! entity lands on the same name in any fresh store; collisions step
//! linearly through the pool.

use veil_core::errors::{AliasError, VeilResult};
use veil_core::traits::AliasLedger;
use veil_core::types::{CanonicalEntity, EntityType};

use super::AliasGenerator;

#[derive(Debug, Clone)]
pub struct NamePoolAliases {
    entity_type: EntityType,
    names: Vec<String>,
}

impl NamePoolAliases {
    pub fn new(entity_type: EntityType, names: Vec<String>) -> Self {
        Self { entity_type, names }
    }

    fn start_slot(&self, entity: &CanonicalEntity) -> usize {
        let hash = blake3::hash(&entity.key.to_storage_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        (u64::from_le_bytes(head) % self.names.len() as u64) as usize
    }
}

impl AliasGenerator for NamePoolAliases {
    fn generate(&self, entity: &CanonicalEntity, ledger: &dyn AliasLedger) -> VeilResult<String> {
        let exhausted = || AliasError::AliasSpaceExhausted {
            entity_type: self.entity_type,
            capacity: self.names.len() as u64,
        };
        if self.names.is_empty() {
            return Err(exhausted().into());
        }

        let start = self.start_slot(entity);
        for offset in 0..self.names.len() {
            let name = &self.names[(start + offset) % self.names.len()];
            if !ledger.is_alias_taken(self.entity_type, name)? {
                return Ok(name.clone());
            }
        }
        Err(exhausted().into())
    }

    fn capacity(&self) -> u64 {
        self.names.len() as u64
    }
}
