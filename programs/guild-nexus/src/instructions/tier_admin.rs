use anchor_lang::prelude::*;

use crate::{
    constants::{NEXUS_SEED, RANK_COUNT, TIER_CONFIG_SEED},
    errors::NexusError,
    events::{TierConditionsUpdated, TierConfigUpdated},
    state::{default_rank_bands, NexusState, TierConfig},
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitTierConfigInput {
    pub magistrate: Pubkey,
    pub xp_mint: Pubkey,
    pub max_tier: u8,
    /// Rank of each tier level 1..=max_tier, one rank per tier when omitted
    pub tier_ranks: Option<Vec<u8>>,
}

/// Writes the reference ladder. Rank bands cannot change afterwards.
pub fn initialize_tier_config(
    ctx: Context<InitializeTierConfig>,
    input: InitTierConfigInput,
) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    require!(
        input.magistrate != Pubkey::default(),
        NexusError::InvalidAddress
    );

    let bands = input
        .tier_ranks
        .unwrap_or_else(|| default_rank_bands(input.max_tier));
    let config = TierConfig::with_bands(
        input.magistrate,
        input.xp_mint,
        ctx.bumps.tier_config,
        input.max_tier,
        &bands,
    )?;
    ctx.accounts.tier_config.set_inner(config);

    msg!(
        "Guild Nexus: tier config initialized, {} tiers, magistrate {}",
        input.max_tier,
        input.magistrate
    );
    emit!(TierConfigUpdated {
        magistrate: input.magistrate,
        xp_mint: input.xp_mint,
    });

    Ok(())
}

pub fn set_conditions(
    ctx: Context<UpdateTierConfig>,
    tier: u8,
    experience_threshold: u64,
    required_counts: [u32; RANK_COUNT],
) -> Result<()> {
    ctx.accounts.nexus.require_active()?;

    let config = &mut ctx.accounts.tier_config;
    config.set_conditions(tier, experience_threshold, required_counts)?;

    msg!(
        "Guild Nexus: tier {} needs {} experience and {:?} descendants",
        tier,
        experience_threshold,
        required_counts
    );
    emit!(TierConditionsUpdated {
        tier,
        experience_threshold,
        required_counts,
        ration_limit: config.ration_limit(tier),
    });

    Ok(())
}

pub fn set_ration_limit(ctx: Context<UpdateTierConfig>, tier: u8, limit: u32) -> Result<()> {
    ctx.accounts.nexus.require_active()?;

    let config = &mut ctx.accounts.tier_config;
    config.set_ration_limit(tier, limit)?;

    let condition = config
        .condition(tier)
        .copied()
        .ok_or(NexusError::TierOutOfRange)?;

    msg!("Guild Nexus: tier {} ration limit set to {}", tier, limit);
    emit!(TierConditionsUpdated {
        tier,
        experience_threshold: condition.experience_threshold,
        required_counts: condition.required_counts,
        ration_limit: limit,
    });

    Ok(())
}

pub fn set_xp_mint(ctx: Context<UpdateTierConfig>, xp_mint: Pubkey) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    require!(xp_mint != Pubkey::default(), NexusError::InvalidAddress);

    let config = &mut ctx.accounts.tier_config;
    config.xp_mint = xp_mint;

    msg!("Guild Nexus: XP mint set to {}", xp_mint);
    emit!(TierConfigUpdated {
        magistrate: config.magistrate,
        xp_mint,
    });

    Ok(())
}

pub fn set_magistrate(ctx: Context<UpdateTierConfig>, new_magistrate: Pubkey) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    require!(
        new_magistrate != Pubkey::default(),
        NexusError::InvalidAddress
    );

    let config = &mut ctx.accounts.tier_config;
    config.magistrate = new_magistrate;

    msg!("Guild Nexus: magistrate changed to {}", new_magistrate);
    emit!(TierConfigUpdated {
        magistrate: new_magistrate,
        xp_mint: config.xp_mint,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeTierConfig<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [NEXUS_SEED],
        bump = nexus.bump,
        has_one = owner @ NexusError::NotAuthorized,
    )]
    pub nexus: Account<'info, NexusState>,

    #[account(
        init,
        payer = owner,
        space = 8 + TierConfig::INIT_SPACE,
        seeds = [TIER_CONFIG_SEED],
        bump,
    )]
    pub tier_config: Account<'info, TierConfig>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UpdateTierConfig<'info> {
    pub magistrate: Signer<'info>,

    #[account(seeds = [NEXUS_SEED], bump = nexus.bump)]
    pub nexus: Account<'info, NexusState>,

    #[account(
        mut,
        seeds = [TIER_CONFIG_SEED],
        bump = tier_config.bump,
        has_one = magistrate @ NexusError::NotAuthorized,
    )]
    pub tier_config: Account<'info, TierConfig>,
}
