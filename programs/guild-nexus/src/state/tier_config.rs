use anchor_lang::prelude::*;

use crate::{
    constants::{DEFAULT_MAX_TIER, MAX_TIER_LEVEL, RANK_COUNT},
    errors::NexusError,
    referral::TierCounts,
};

/// Promotion requirements for reaching one tier level.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierCondition {
    /// Minimum XP balance held by the account vault
    pub experience_threshold: u64,

    /// Minimum descendants per rank (index 0 is rank 1)
    pub required_counts: [u32; RANK_COUNT],

    /// Ration allowance granted at this tier
    pub ration_limit: u32,
}

impl TierCondition {
    /// Placeholder for configured-but-unset levels, never promotable.
    pub const UNREACHABLE: Self = Self {
        experience_threshold: u64::MAX,
        required_counts: [0; RANK_COUNT],
        ration_limit: 0,
    };
}

/// Promotion ladder. Seeds: [b"tier_config"]
#[account]
#[derive(InitSpace)]
pub struct TierConfig {
    /// Authority allowed to change conditions
    pub magistrate: Pubkey,

    /// Mint of the guild XP token; the vault balance of this mint is experience
    pub xp_mint: Pubkey,

    /// Highest tier level accounts can reach
    pub max_tier: u8,

    /// Classification rank of each tier level (index 0 is tier 1), fixed at init
    pub tier_ranks: [u8; MAX_TIER_LEVEL],

    /// Conditions for reaching each tier level (index 0 is tier 1)
    pub conditions: [TierCondition; MAX_TIER_LEVEL],

    /// Bump seed for PDA
    pub bump: u8,
}

const REFERENCE_THRESHOLDS: [u64; DEFAULT_MAX_TIER as usize] =
    [300, 447_000, 3_722_400, 73_762_700, 534_633_200];

const REFERENCE_REQUIRED: [[u32; RANK_COUNT]; DEFAULT_MAX_TIER as usize] = [
    [0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0],
    [5, 1, 0, 0, 0],
    [5, 2, 1, 0, 0],
    [5, 2, 1, 1, 0],
];

const REFERENCE_RATION_LIMITS: [u32; DEFAULT_MAX_TIER as usize] = [2, 3, 4, 5, 6];

const RANK_NAMES: [&str; RANK_COUNT] = ["novice", "adept", "expert", "master", "god"];

pub fn rank_name(rank: u8) -> Option<&'static str> {
    RANK_NAMES.get((rank as usize).checked_sub(1)?).copied()
}

/// Extends `bands` for the first `max_tier` levels to the full table and
/// checks that ranks never go down.
pub fn expand_rank_bands(max_tier: u8, bands: &[u8]) -> Result<[u8; MAX_TIER_LEVEL]> {
    require!(
        max_tier >= 1 && max_tier as usize <= MAX_TIER_LEVEL,
        NexusError::TierOutOfRange
    );
    require!(
        bands.len() == max_tier as usize,
        NexusError::InvalidRankBands
    );

    let mut ranks = [RANK_COUNT as u8; MAX_TIER_LEVEL];
    let mut previous = 1u8;
    for (level, rank) in bands.iter().enumerate() {
        require!(
            (1..=RANK_COUNT as u8).contains(rank) && *rank >= previous,
            NexusError::InvalidRankBands
        );
        ranks[level] = *rank;
        previous = *rank;
    }
    // levels above the ladder keep the top band so the table stays monotone
    for rank in ranks.iter_mut().skip(bands.len()) {
        *rank = previous;
    }

    Ok(ranks)
}

/// One rank per tier, saturating at the top rank.
pub fn default_rank_bands(max_tier: u8) -> Vec<u8> {
    (1..=max_tier).map(|tier| tier.min(RANK_COUNT as u8)).collect()
}

impl TierConfig {
    /// Ladder used by the reference deployment: five tiers, one rank each.
    pub fn reference(magistrate: Pubkey, xp_mint: Pubkey, bump: u8) -> Self {
        let mut conditions = [TierCondition::UNREACHABLE; MAX_TIER_LEVEL];
        for (level, condition) in conditions
            .iter_mut()
            .take(DEFAULT_MAX_TIER as usize)
            .enumerate()
        {
            *condition = TierCondition {
                experience_threshold: REFERENCE_THRESHOLDS[level],
                required_counts: REFERENCE_REQUIRED[level],
                ration_limit: REFERENCE_RATION_LIMITS[level],
            };
        }

        let mut tier_ranks = [RANK_COUNT as u8; MAX_TIER_LEVEL];
        for (level, rank) in tier_ranks
            .iter_mut()
            .take(DEFAULT_MAX_TIER as usize)
            .enumerate()
        {
            *rank = level as u8 + 1;
        }

        Self {
            magistrate,
            xp_mint,
            max_tier: DEFAULT_MAX_TIER,
            tier_ranks,
            conditions,
            bump,
        }
    }

    /// Reference conditions with a custom ladder height and rank bands.
    pub fn with_bands(
        magistrate: Pubkey,
        xp_mint: Pubkey,
        bump: u8,
        max_tier: u8,
        bands: &[u8],
    ) -> Result<Self> {
        let tier_ranks = expand_rank_bands(max_tier, bands)?;
        let mut config = Self::reference(magistrate, xp_mint, bump);
        config.max_tier = max_tier;
        config.tier_ranks = tier_ranks;
        for condition in config.conditions.iter_mut().skip(max_tier as usize) {
            *condition = TierCondition::UNREACHABLE;
        }
        Ok(config)
    }

    pub fn max_tier(&self) -> u8 {
        self.max_tier
    }

    /// Classification rank of `tier`.
    pub fn rank_of(&self, tier: u8) -> Result<u8> {
        require!(
            tier >= 1 && tier <= self.max_tier,
            NexusError::TierOutOfRange
        );
        Ok(self.tier_ranks[tier as usize - 1])
    }

    pub fn condition(&self, tier: u8) -> Option<&TierCondition> {
        if tier == 0 || tier > self.max_tier {
            return None;
        }
        self.conditions.get(tier as usize - 1)
    }

    pub fn ration_limit(&self, tier: u8) -> u32 {
        self.condition(tier)
            .map(|condition| condition.ration_limit)
            .unwrap_or(0)
    }

    /// True when an account at `tier` qualifies for `tier + 1`.
    pub fn can_promote(&self, tier: u8, experience: u64, counts: &TierCounts) -> bool {
        let Some(next) = tier.checked_add(1) else {
            return false;
        };
        match self.condition(next) {
            Some(condition) => {
                experience >= condition.experience_threshold
                    && counts.meets(&condition.required_counts)
            }
            None => false,
        }
    }

    pub fn set_conditions(
        &mut self,
        tier: u8,
        experience_threshold: u64,
        required_counts: [u32; RANK_COUNT],
    ) -> Result<()> {
        require!(
            tier >= 1 && tier <= self.max_tier,
            NexusError::TierOutOfRange
        );
        let condition = &mut self.conditions[tier as usize - 1];
        condition.experience_threshold = experience_threshold;
        condition.required_counts = required_counts;
        Ok(())
    }

    pub fn set_ration_limit(&mut self, tier: u8, limit: u32) -> Result<()> {
        require!(
            tier >= 1 && tier <= self.max_tier,
            NexusError::TierOutOfRange
        );
        self.conditions[tier as usize - 1].ration_limit = limit;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::assert_nexus_error;

    fn config() -> TierConfig {
        TierConfig::reference(Pubkey::new_unique(), Pubkey::new_unique(), 255)
    }

    #[test]
    fn test_tier_two_needs_three_novices() {
        let config = config();

        let two = TierCounts::from_array([2, 0, 0, 0, 0]);
        assert!(!config.can_promote(1, 447_000, &two));
        assert!(!config.can_promote(1, 500_000, &two));

        let three = TierCounts::from_array([3, 0, 0, 0, 0]);
        assert!(config.can_promote(1, 500_000, &three));
        assert!(config.can_promote(1, 447_000, &three));
        assert!(!config.can_promote(1, 446_999, &three));
    }

    #[test]
    fn test_reference_ladder_values() {
        let config = config();

        assert_eq!(config.max_tier(), 5);
        assert_eq!(config.condition(1).unwrap().experience_threshold, 300);
        assert_eq!(config.condition(5).unwrap().experience_threshold, 534_633_200);
        assert_eq!(config.condition(4).unwrap().required_counts, [5, 2, 1, 0, 0]);
        assert_eq!(config.ration_limit(1), 2);
        assert_eq!(config.ration_limit(5), 6);
        assert_eq!(config.ration_limit(6), 0);
        assert!(config.condition(0).is_none());
        assert!(config.condition(6).is_none());
    }

    #[test]
    fn test_higher_ranks_count_toward_lower_requirements_only_by_rank() {
        let config = config();
        // tier 3 needs five novices and one adept, an expert is no substitute
        let counts = TierCounts::from_array([5, 0, 1, 0, 0]);
        assert!(!config.can_promote(2, u64::MAX, &counts));

        let counts = TierCounts::from_array([5, 1, 0, 0, 0]);
        assert!(config.can_promote(2, 3_722_400, &counts));
    }

    #[test]
    fn test_top_tier_is_never_promotable() {
        let config = config();
        let counts = TierCounts::from_array([u32::MAX; 5]);

        assert!(!config.can_promote(5, u64::MAX, &counts));
        assert!(!config.can_promote(u8::MAX, u64::MAX, &counts));
    }

    #[test]
    fn test_rank_of_follows_bands() {
        let config = config();
        for tier in 1..=5 {
            assert_eq!(config.rank_of(tier).unwrap(), tier);
        }
        assert_nexus_error(config.rank_of(0), NexusError::TierOutOfRange);
        assert_nexus_error(config.rank_of(6), NexusError::TierOutOfRange);
        assert_eq!(rank_name(1), Some("novice"));
        assert_eq!(rank_name(5), Some("god"));
        assert_eq!(rank_name(0), None);
        assert_eq!(rank_name(6), None);
    }

    #[test]
    fn test_custom_bands_share_ranks() {
        let config = TierConfig::with_bands(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            255,
            7,
            &[1, 1, 2, 3, 4, 5, 5],
        )
        .unwrap();

        assert_eq!(config.max_tier(), 7);
        assert_eq!(config.rank_of(2).unwrap(), 1);
        assert_eq!(config.rank_of(7).unwrap(), 5);
        // new levels stay closed until the magistrate sets them
        assert!(!config.can_promote(5, u64::MAX - 1, &TierCounts::default()));
    }

    #[test]
    fn test_rank_bands_must_be_monotone_and_in_range() {
        assert_nexus_error(expand_rank_bands(3, &[1, 3, 2]), NexusError::InvalidRankBands);
        assert_nexus_error(expand_rank_bands(2, &[0, 1]), NexusError::InvalidRankBands);
        assert_nexus_error(expand_rank_bands(2, &[1, 6]), NexusError::InvalidRankBands);
        assert_nexus_error(expand_rank_bands(3, &[1, 2]), NexusError::InvalidRankBands);
        assert_nexus_error(expand_rank_bands(0, &[]), NexusError::TierOutOfRange);
        assert_nexus_error(expand_rank_bands(11, &[5; 11]), NexusError::TierOutOfRange);

        let ranks = expand_rank_bands(3, &[2, 2, 4]).unwrap();
        assert_eq!(ranks, [2, 2, 4, 4, 4, 4, 4, 4, 4, 4]);
        assert_eq!(default_rank_bands(7), vec![1, 2, 3, 4, 5, 5, 5]);
    }

    #[test]
    fn test_setters_stay_inside_ladder() {
        let mut config = config();

        config.set_conditions(2, 1_000, [1, 0, 0, 0, 0]).unwrap();
        config.set_ration_limit(2, 9).unwrap();
        let condition = config.condition(2).unwrap();
        assert_eq!(condition.experience_threshold, 1_000);
        assert_eq!(condition.required_counts, [1, 0, 0, 0, 0]);
        assert_eq!(condition.ration_limit, 9);

        assert_nexus_error(config.set_conditions(6, 1, [0; 5]), NexusError::TierOutOfRange);
        assert_nexus_error(config.set_ration_limit(0, 1), NexusError::TierOutOfRange);
    }
}
