//! Configuration system for veil.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod alias_config;
pub mod batch_config;
pub mod defaults;
pub mod exclusion_config;
pub mod normalizer_config;
pub mod resolution_config;
pub mod storage_config;
pub mod veil_config;

pub use alias_config::{AliasConfig, AliasScheme};
pub use batch_config::BatchConfig;
pub use exclusion_config::{ExclusionConfig, ExclusionPattern};
pub use normalizer_config::NormalizerConfig;
pub use resolution_config::{AmbiguityPolicy, ResolutionConfig};
pub use storage_config::StorageConfig;
pub use veil_config::{ConfigOverrides, VeilConfig};
