//! Error handling for veil.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod alias_error;
pub mod cipher_error;
pub mod config_error;
pub mod error_code;
pub mod normalize_error;
pub mod review_error;
pub mod storage_error;
pub mod veil_error;

pub use alias_error::AliasError;
pub use cipher_error::CipherError;
pub use config_error::ConfigError;
pub use error_code::VeilErrorCode;
pub use normalize_error::NormalizeError;
pub use review_error::ReviewError;
pub use storage_error::StorageError;
pub use veil_error::{VeilError, VeilResult};
