// Single source of truth for all default values.

// --- Normalizer ---
/// Honorific prefixes stripped from the start of an occurrence (one at most).
pub const DEFAULT_HONORIFICS: &[&str] = &[
    "M.", "MM.", "Mme", "Mme.", "Mmes", "Mlle", "Mlles", "Me", "Mes", "Maître", "Maîtres",
    "Monsieur", "Messieurs", "Madame", "Mesdames", "Mademoiselle", "Mesdemoiselles", "Dr",
    "Dr.", "Drs", "Drs.", "Docteur", "Docteurs", "Pr", "Pr.", "Prs", "Professeur", "Professeurs",
    "Mr", "Mr.", "Mrs", "Mrs.", "Ms", "Ms.",
];

// --- Aliases ---
pub const DEFAULT_PERSON_PREFIX: &str = "PERSON_";
pub const DEFAULT_LOCATION_PREFIX: &str = "LOCATION_";
pub const DEFAULT_ORG_PREFIX: &str = "ORG_";
pub const DEFAULT_SEQUENTIAL_CAPACITY: u64 = 1_000_000;

// --- Exclusion ---
pub const DEFAULT_BUILTIN_EXCLUSIONS: bool = true;

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "veil-mappings.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_MAX_WRITE_RETRIES: u32 = 5;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 20;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 1_000;

// --- Observability ---
pub const DEFAULT_LOG_FILTER: &str = "veil_core=info,veil_privacy=info,veil_storage=info,veil_engine=info";
