//! `{prefix}{n}` aliases.

use veil_core::errors::{AliasError, VeilResult};
use veil_core::traits::AliasLedger;
use veil_core::types::{CanonicalEntity, EntityType};

use super::AliasGenerator;

#[derive(Debug, Clone)]
pub struct SequentialAliases {
    entity_type: EntityType,
    prefix: String,
    capacity: u64,
}

impl SequentialAliases {
    pub fn new(entity_type: EntityType, prefix: impl Into<String>, capacity: u64) -> Self {
        Self {
            entity_type,
            prefix: prefix.into(),
            capacity,
        }
    }

    fn alias(&self, n: u64) -> String {
        format!("{}{}", self.prefix, n)
    }
}

impl AliasGenerator for SequentialAliases {
    /// Starts at `assigned + 1` and walks upward, then from 1, skipping
    /// numbers already taken (edited aliases can occupy them). Every number
    /// up to `capacity` is tried before giving up; none is ever reused.
    fn generate(&self, _entity: &CanonicalEntity, ledger: &dyn AliasLedger) -> VeilResult<String> {
        let assigned = ledger.assigned_count(self.entity_type)?;
        let start = assigned.saturating_add(1).min(self.capacity.max(1));
        for n in (start..=self.capacity).chain(1..start) {
            let alias = self.alias(n);
            if !ledger.is_alias_taken(self.entity_type, &alias)? {
                return Ok(alias);
            }
        }
        Err(AliasError::AliasSpaceExhausted {
            entity_type: self.entity_type,
            capacity: self.capacity,
        }
        .into())
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }
}
