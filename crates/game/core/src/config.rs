/// Session configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SohlConfig {
    /// Seed of the deterministic id generator.
    pub id_seed: u64,
    /// Number of characters in generated ids.
    pub id_length: usize,
    /// Schema version stamped on newly created documents.
    pub schema_version: String,
}

impl SohlConfig {
    // ===== compile-time constants =====
    /// Namespace every delta and modifier name must start with.
    pub const NAMESPACE_PREFIX: &'static str = "SOHL.";
    /// Reason recorded when a modifier is disabled with a plain `true`.
    pub const DISABLED_REASON: &'static str = "SOHL.DELTAINFO.DISABLED";
    /// Expiration point of permanent events (largest exactly representable
    /// integer in an IEEE double, kept for data compatibility).
    pub const PERMANENT_EXPIRE: i64 = 9_007_199_254_740_991;
    /// Characters used by generated ids.
    pub const ID_ALPHABET: &'static [u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SCHEMA_VERSION: &'static str = "0.6.0";
    pub const DEFAULT_ID_LENGTH: usize = 16;
    pub const DEFAULT_ID_SEED: u64 = 0x5348_4f4c_0006_0000;

    pub fn new() -> Self {
        Self {
            id_seed: Self::DEFAULT_ID_SEED,
            id_length: Self::DEFAULT_ID_LENGTH,
            schema_version: Self::DEFAULT_SCHEMA_VERSION.to_string(),
        }
    }

    pub fn with_id_seed(id_seed: u64) -> Self {
        Self {
            id_seed,
            ..Self::new()
        }
    }
}

impl Default for SohlConfig {
    fn default() -> Self {
        Self::new()
    }
}
