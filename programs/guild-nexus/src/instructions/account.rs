use anchor_lang::prelude::*;
use anchor_spl::token_interface::TokenAccount;

use crate::{
    constants::{HANDLER_SEED, NEXUS_SEED, TIER_CONFIG_SEED, VAULT_SEED},
    errors::NexusError,
    events::{EligibilityChanged, TierChanged},
    instructions::chain::propagate_tier_change,
    state::{rank_name, AccountHandler, NexusState, TierConfig},
};

/// Promotes the account one tier if it meets the next tier's conditions.
pub fn tier_up<'info>(ctx: Context<'_, '_, 'info, 'info, TierUp<'info>>) -> Result<()> {
    ctx.accounts.nexus.require_active()?;

    let experience = ctx.accounts.experience.amount;
    let handler_key = ctx.accounts.handler.key();
    let transition = ctx
        .accounts
        .handler
        .promote(&ctx.accounts.tier_config, experience)?;

    propagate_tier_change(
        &ctx.accounts.handler,
        &ctx.accounts.tier_config,
        transition,
        ctx.remaining_accounts,
    )?;

    let rank = ctx.accounts.tier_config.rank_of(transition.to)?;
    msg!(
        "Guild Nexus: {} promoted from tier {} to tier {} ({})",
        handler_key,
        transition.from,
        transition.to,
        rank_name(rank).unwrap_or("unranked")
    );
    emit!(TierChanged {
        handler: handler_key,
        from: transition.from,
        to: transition.to,
        forced: false,
    });

    Ok(())
}

/// Forces the account to a higher tier without checking conditions.
pub fn set_tier<'info>(
    ctx: Context<'_, '_, 'info, 'info, SetTier<'info>>,
    new_tier: u8,
) -> Result<()> {
    ctx.accounts.nexus.require_active()?;

    let handler_key = ctx.accounts.handler.key();
    let transition = ctx
        .accounts
        .handler
        .override_tier(&ctx.accounts.tier_config, new_tier)?;

    propagate_tier_change(
        &ctx.accounts.handler,
        &ctx.accounts.tier_config,
        transition,
        ctx.remaining_accounts,
    )?;

    let rank = ctx.accounts.tier_config.rank_of(transition.to)?;
    msg!(
        "Guild Nexus: {} set from tier {} to tier {} ({}) by {}",
        handler_key,
        transition.from,
        transition.to,
        rank_name(rank).unwrap_or("unranked"),
        ctx.accounts.authority.key()
    );
    emit!(TierChanged {
        handler: handler_key,
        from: transition.from,
        to: transition.to,
        forced: true,
    });

    Ok(())
}

pub fn change_eligibility(ctx: Context<ChangeEligibility>, eligible: bool) -> Result<()> {
    ctx.accounts.nexus.require_active()?;

    let handler = &mut ctx.accounts.handler;
    handler.set_eligibility(eligible);

    msg!(
        "Guild Nexus: {} eligibility for tier up set to {}",
        handler.key(),
        eligible
    );
    emit!(EligibilityChanged {
        handler: handler.key(),
        eligible,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct TierUp<'info> {
    pub owner: Signer<'info>,

    #[account(seeds = [NEXUS_SEED], bump = nexus.bump)]
    pub nexus: Account<'info, NexusState>,

    #[account(seeds = [TIER_CONFIG_SEED], bump = tier_config.bump)]
    pub tier_config: Account<'info, TierConfig>,

    #[account(
        mut,
        seeds = [HANDLER_SEED, &handler.identity_id().to_le_bytes()],
        bump = handler.bump(),
    )]
    pub handler: Account<'info, AccountHandler>,

    /// Token account holding the identity token, proves `owner` holds it
    #[account(
        constraint = identity_token.mint == handler.identity_mint() @ NexusError::NotAccountOwner,
        constraint = identity_token.owner == owner.key() @ NexusError::NotAccountOwner,
        constraint = identity_token.amount == 1 @ NexusError::NotAccountOwner,
    )]
    pub identity_token: InterfaceAccount<'info, TokenAccount>,

    #[account(seeds = [VAULT_SEED, handler.key().as_ref()], bump = handler.vault_bump())]
    pub vault: SystemAccount<'info>,

    /// Vault's XP balance, read as experience
    #[account(
        constraint = experience.mint == tier_config.xp_mint @ NexusError::InvalidExperienceAccount,
        constraint = experience.owner == vault.key() @ NexusError::InvalidExperienceAccount,
    )]
    pub experience: InterfaceAccount<'info, TokenAccount>,
}

#[derive(Accounts)]
pub struct SetTier<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [NEXUS_SEED],
        bump = nexus.bump,
        constraint = nexus.is_tier_authority(&authority.key()) @ NexusError::NotAuthorized,
    )]
    pub nexus: Account<'info, NexusState>,

    #[account(seeds = [TIER_CONFIG_SEED], bump = tier_config.bump)]
    pub tier_config: Account<'info, TierConfig>,

    #[account(
        mut,
        seeds = [HANDLER_SEED, &handler.identity_id().to_le_bytes()],
        bump = handler.bump(),
    )]
    pub handler: Account<'info, AccountHandler>,
}

#[derive(Accounts)]
pub struct ChangeEligibility<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [NEXUS_SEED],
        bump = nexus.bump,
        has_one = owner @ NexusError::NotAuthorized,
    )]
    pub nexus: Account<'info, NexusState>,

    #[account(
        mut,
        seeds = [HANDLER_SEED, &handler.identity_id().to_le_bytes()],
        bump = handler.bump(),
    )]
    pub handler: Account<'info, AccountHandler>,
}
