pub const NEXUS_SEED: &[u8] = b"nexus";
pub const TIER_CONFIG_SEED: &[u8] = b"tier_config";
pub const FEE_SCHEDULE_SEED: &[u8] = b"fee_schedule";
pub const HANDLER_SEED: &[u8] = b"handler";
pub const IDENTITY_SEED: &[u8] = b"identity";
pub const VAULT_SEED: &[u8] = b"vault";

/// Maximum number of ancestor generations any referral walk visits.
pub const MAX_REFERRAL_DEPTH: usize = 5;

/// Classification ranks: novice, adept, expert, master, god.
pub const RANK_COUNT: usize = 5;

/// Highest tier level a ladder can be configured with.
pub const MAX_TIER_LEVEL: usize = 10;

/// Tier levels present in the reference ladder.
pub const DEFAULT_MAX_TIER: u8 = 5;

/// Referral layers that receive a share of a referral rewards pool.
pub const REFERRAL_LAYERS: usize = 4;

/// Tiers that carry a row in the referral distribution matrix.
pub const REFERRAL_TIERS: usize = 5;

pub const BPS_DENOMINATOR: u64 = 10_000;

/// Token-bound account operation kinds. Only `OPERATION_CALL` is executed.
pub const OPERATION_CALL: u8 = 0;
pub const OPERATION_DELEGATECALL: u8 = 1;
pub const OPERATION_CREATE: u8 = 2;
pub const OPERATION_CREATE2: u8 = 3;

pub const MAX_BATCH_CALLS: usize = 8;

// Sentinels returned from signature checks
pub const VALID_SIGNATURE_MAGIC: u32 = 0x1626_ba7e;
pub const VALID_SIGNER_MAGIC: u32 = 0x523e_3260;
pub const INVALID_SIGNATURE_MAGIC: u32 = 0x0000_0000;

// Ed25519 native program instruction layout
pub const ED25519_HEADER_LEN: usize = 2 + 7 * 2;
pub const ED25519_PUBKEY_LEN: usize = 32;
pub const ED25519_SIG_LEN: usize = 64;
