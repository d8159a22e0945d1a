use anchor_lang::prelude::*;

use crate::{
    constants::{BPS_DENOMINATOR, REFERRAL_LAYERS, REFERRAL_TIERS},
    errors::NexusError,
};

/// Fees taken from a seeker's payment, in basis points.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeekerFees {
    pub referral_rewards: u64,
    pub platform_revenue: u64,
    pub shares_fee: u64,
}

/// Fees taken from a solver's reward, in basis points.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverFees {
    pub referral_rewards: u64,
    pub platform_revenue: u64,
    pub platform_treasury: u64,
    pub shares_fee: u64,
}

/// Fees taken from a party reward, in basis points.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartyFees {
    pub leader_rewards: u64,
    pub referral_rewards: u64,
    pub platform_revenue: u64,
    pub members_rewards: u64,
}

/// Destinations for protocol fees.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Treasuries {
    pub platform_treasury: Pubkey,
    pub platform_revenue_pool: Pubkey,
    pub referral_tax_treasury: Pubkey,
    pub dispute_fees_treasury: Pubkey,
    pub participation_reward_pool: Pubkey,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreasuryKind {
    PlatformTreasury,
    PlatformRevenuePool,
    ReferralTaxTreasury,
    DisputeFeesTreasury,
    ParticipationRewardPool,
}

impl Treasuries {
    fn slot_mut(&mut self, kind: TreasuryKind) -> &mut Pubkey {
        match kind {
            TreasuryKind::PlatformTreasury => &mut self.platform_treasury,
            TreasuryKind::PlatformRevenuePool => &mut self.platform_revenue_pool,
            TreasuryKind::ReferralTaxTreasury => &mut self.referral_tax_treasury,
            TreasuryKind::DisputeFeesTreasury => &mut self.dispute_fees_treasury,
            TreasuryKind::ParticipationRewardPool => &mut self.participation_reward_pool,
        }
    }
}

const REFERENCE_REFERRAL_RATES: [[u64; REFERRAL_LAYERS]; REFERRAL_TIERS] = [
    [1_200, 800, 400, 200],
    [1_600, 1_050, 525, 260],
    [2_000, 1_300, 650, 375],
    [2_400, 1_600, 800, 400],
    [3_000, 2_000, 1_000, 600],
];

/// Fee tables and treasuries. Seeds: [b"fee_schedule"]
#[account]
#[derive(InitSpace)]
pub struct FeeSchedule {
    /// Authority allowed to change fees and treasuries
    pub custodian: Pubkey,

    pub seeker: SeekerFees,

    pub solver: SolverFees,

    pub party: PartyFees,

    /// Referral reward shares, rows by referrer tier (1..=5), columns by
    /// layer distance (1..=4)
    pub referral_rates: [[u64; REFERRAL_LAYERS]; REFERRAL_TIERS],

    /// Share of a dispute stake kept as deposit
    pub dispute_deposit_rate: u64,

    /// Tax withheld from referral rewards
    pub referral_rewards_tax: u64,

    /// Share of referral rewards routed to platform revenue
    pub referral_rewards_revenue: u64,

    pub treasuries: Treasuries,

    /// Bump seed for PDA
    pub bump: u8,
}

/// Parts of an amount and what is left after taking them.
///
/// `parts` sum plus `remainder` is always the original amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Split<const N: usize> {
    pub parts: [u64; N],
    pub remainder: u64,
}

impl<const N: usize> Split<N> {
    fn from_rates(amount: u64, rates: [u64; N]) -> Result<Self> {
        let mut parts = [0u64; N];
        let mut taken = 0u64;
        for (part, rate) in parts.iter_mut().zip(rates) {
            *part = apply_bps(amount, rate)?;
            taken = taken.checked_add(*part).ok_or(NexusError::MathOverflow)?;
        }
        let remainder = amount
            .checked_sub(taken)
            .ok_or(NexusError::FeesExceedAmount)?;
        Ok(Self { parts, remainder })
    }

    pub fn total(&self) -> u64 {
        self.parts.iter().sum::<u64>() + self.remainder
    }
}

/// `amount * bps / 10000`, rounded down.
pub fn apply_bps(amount: u64, bps: u64) -> Result<u64> {
    let value = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(NexusError::MathOverflow)?
        / BPS_DENOMINATOR as u128;
    u64::try_from(value).map_err(|_| error!(NexusError::MathOverflow))
}

impl SeekerFees {
    /// [referral rewards, platform revenue, shares fee]
    pub fn split(&self, amount: u64) -> Result<Split<3>> {
        Split::from_rates(
            amount,
            [self.referral_rewards, self.platform_revenue, self.shares_fee],
        )
    }
}

impl SolverFees {
    /// [referral rewards, platform revenue, platform treasury, shares fee]
    pub fn split(&self, amount: u64) -> Result<Split<4>> {
        Split::from_rates(
            amount,
            [
                self.referral_rewards,
                self.platform_revenue,
                self.platform_treasury,
                self.shares_fee,
            ],
        )
    }
}

impl PartyFees {
    /// [leader rewards, referral rewards, platform revenue, members rewards]
    pub fn split(&self, amount: u64) -> Result<Split<4>> {
        Split::from_rates(
            amount,
            [
                self.leader_rewards,
                self.referral_rewards,
                self.platform_revenue,
                self.members_rewards,
            ],
        )
    }
}

impl FeeSchedule {
    /// Fee tables used by the reference deployment.
    pub fn reference(custodian: Pubkey, treasuries: Treasuries, bump: u8) -> Self {
        Self {
            custodian,
            seeker: SeekerFees {
                referral_rewards: 100,
                platform_revenue: 100,
                shares_fee: 100,
            },
            solver: SolverFees {
                referral_rewards: 200,
                platform_revenue: 500,
                platform_treasury: 100,
                shares_fee: 200,
            },
            party: PartyFees {
                leader_rewards: 500,
                referral_rewards: 100,
                platform_revenue: 300,
                members_rewards: 100,
            },
            referral_rates: REFERENCE_REFERRAL_RATES,
            dispute_deposit_rate: 1_000,
            referral_rewards_tax: 3_000,
            referral_rewards_revenue: 5_000,
            treasuries,
            bump,
        }
    }

    /// Share for a referrer at `tier` sitting `layer` generations up. Zero
    /// outside the table.
    pub fn referral_share(&self, tier: u8, layer: u8) -> u64 {
        let (Some(row), Some(column)) = (
            (tier as usize).checked_sub(1),
            (layer as usize).checked_sub(1),
        ) else {
            return 0;
        };
        self.referral_rates
            .get(row)
            .and_then(|rates| rates.get(column))
            .copied()
            .unwrap_or(0)
    }

    /// Splits a referral rewards pool over the referrers above an account.
    ///
    /// `layer_tiers[i]` is the tier of the referrer `i + 1` generations up, or
    /// `None` when the chain ended before that layer.
    pub fn distribute_referral_pool(
        &self,
        pool: u64,
        layer_tiers: &[Option<u8>],
    ) -> Result<Split<REFERRAL_LAYERS>> {
        require!(
            layer_tiers.len() <= REFERRAL_LAYERS,
            NexusError::InvalidDepth
        );

        let mut rates = [0u64; REFERRAL_LAYERS];
        for (layer, tier) in layer_tiers.iter().enumerate() {
            if let Some(tier) = tier {
                rates[layer] = self.referral_share(*tier, layer as u8 + 1);
            }
        }
        Split::from_rates(pool, rates)
    }

    /// [tax, net] of a referral reward.
    pub fn referral_tax(&self, reward: u64) -> Result<Split<1>> {
        Split::from_rates(reward, [self.referral_rewards_tax])
    }

    /// [platform revenue, kept for referrers] of a referral rewards amount.
    pub fn referral_revenue(&self, rewards: u64) -> Result<Split<1>> {
        Split::from_rates(rewards, [self.referral_rewards_revenue])
    }

    pub fn dispute_deposit(&self, stake: u64) -> Result<u64> {
        apply_bps(stake, self.dispute_deposit_rate)
    }

    pub fn treasury(&self, kind: TreasuryKind) -> Pubkey {
        let treasuries = &self.treasuries;
        match kind {
            TreasuryKind::PlatformTreasury => treasuries.platform_treasury,
            TreasuryKind::PlatformRevenuePool => treasuries.platform_revenue_pool,
            TreasuryKind::ReferralTaxTreasury => treasuries.referral_tax_treasury,
            TreasuryKind::DisputeFeesTreasury => treasuries.dispute_fees_treasury,
            TreasuryKind::ParticipationRewardPool => treasuries.participation_reward_pool,
        }
    }

    pub fn set_treasury(&mut self, kind: TreasuryKind, address: Pubkey) -> Result<()> {
        require!(address != Pubkey::default(), NexusError::InvalidAddress);
        *self.treasuries.slot_mut(kind) = address;
        Ok(())
    }
}
