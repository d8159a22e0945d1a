use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

use crate::{
    constants::{HANDLER_SEED, IDENTITY_SEED, NEXUS_SEED, TIER_CONFIG_SEED, VAULT_SEED},
    errors::NexusError,
    events::{
        GuardianChanged, NexusInitialized, OwnershipTransferred, PauseToggled, ProfileCreated,
        ReferralAttached,
    },
    instructions::chain::attach_with_chain,
    state::{AccountHandler, IdentityLink, NexusState, TierConfig},
};

pub fn initialize_nexus(ctx: Context<InitializeNexus>, guardian: Pubkey) -> Result<()> {
    require!(guardian != Pubkey::default(), NexusError::InvalidAddress);

    let nexus = &mut ctx.accounts.nexus;
    nexus.owner = ctx.accounts.owner.key();
    nexus.guardian = guardian;
    nexus.paused = false;
    nexus.profile_count = 0;
    nexus.bump = ctx.bumps.nexus;

    msg!("Guild Nexus: initialized by {} with guardian {}", nexus.owner, guardian);
    emit!(NexusInitialized {
        owner: nexus.owner,
        guardian,
    });

    Ok(())
}

pub fn set_guardian(ctx: Context<OwnerOnly>, new_guardian: Pubkey) -> Result<()> {
    require!(new_guardian != Pubkey::default(), NexusError::InvalidAddress);

    let nexus = &mut ctx.accounts.nexus;
    let previous_guardian = nexus.guardian;
    nexus.guardian = new_guardian;

    msg!("Guild Nexus: guardian changed to {}", new_guardian);
    emit!(GuardianChanged {
        previous_guardian,
        new_guardian,
    });

    Ok(())
}

pub fn transfer_ownership(ctx: Context<OwnerOnly>, new_owner: Pubkey) -> Result<()> {
    require!(new_owner != Pubkey::default(), NexusError::InvalidAddress);

    let nexus = &mut ctx.accounts.nexus;
    let previous_owner = nexus.owner;
    nexus.owner = new_owner;

    msg!("Guild Nexus: ownership transferred to {}", new_owner);
    emit!(OwnershipTransferred {
        previous_owner,
        new_owner,
    });

    Ok(())
}

pub fn set_paused(ctx: Context<GuardianOnly>, paused: bool) -> Result<()> {
    let nexus = &mut ctx.accounts.nexus;
    nexus.paused = paused;

    msg!("Guild Nexus: paused = {}", paused);
    emit!(PauseToggled {
        guardian: ctx.accounts.guardian.key(),
        paused,
    });

    Ok(())
}

pub fn create_profile<'info>(
    ctx: Context<'_, '_, 'info, 'info, CreateProfile<'info>>,
    identity_id: u64,
    referrer: Option<Pubkey>,
) -> Result<()> {
    // 1. Gate and claim the next identity id
    ctx.accounts.nexus.require_active()?;
    ctx.accounts.nexus.register_identity(identity_id)?;

    // 2. Write the handler and the mint binding
    let handler_key = ctx.accounts.handler.key();
    let identity_mint = ctx.accounts.identity_mint.key();
    ctx.accounts.handler.set_inner(AccountHandler::new(
        identity_id,
        identity_mint,
        ctx.bumps.handler,
        ctx.bumps.vault,
    ));
    ctx.accounts.identity_link.set_inner(IdentityLink {
        identity_id,
        handler: handler_key,
        bump: ctx.bumps.identity_link,
    });

    // 3. Attach under the referrer in the same instruction
    match referrer {
        Some(referrer) => {
            let credited = attach_with_chain(
                handler_key,
                &mut ctx.accounts.handler,
                referrer,
                &ctx.accounts.tier_config,
                ctx.remaining_accounts,
            )?;

            msg!(
                "Guild Nexus: identity {} referred by {} ({} ancestors credited)",
                identity_id,
                referrer,
                credited
            );
            emit!(ReferralAttached {
                handler: handler_key,
                referrer,
                ancestors_updated: credited as u8,
            });
        }
        None => {
            require!(
                ctx.remaining_accounts.is_empty(),
                NexusError::BrokenReferralChain
            );
        }
    }

    msg!(
        "Guild Nexus: profile {} created for identity {}",
        handler_key,
        identity_id
    );
    emit!(ProfileCreated {
        identity_id,
        identity_mint,
        handler: handler_key,
        vault: ctx.accounts.vault.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeNexus<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init,
        payer = owner,
        space = 8 + NexusState::INIT_SPACE,
        seeds = [NEXUS_SEED],
        bump,
    )]
    pub nexus: Account<'info, NexusState>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct OwnerOnly<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [NEXUS_SEED],
        bump = nexus.bump,
        has_one = owner @ NexusError::NotAuthorized,
    )]
    pub nexus: Account<'info, NexusState>,
}

#[derive(Accounts)]
pub struct GuardianOnly<'info> {
    pub guardian: Signer<'info>,

    #[account(
        mut,
        seeds = [NEXUS_SEED],
        bump = nexus.bump,
        has_one = guardian @ NexusError::NotAuthorized,
    )]
    pub nexus: Account<'info, NexusState>,
}

#[derive(Accounts)]
#[instruction(identity_id: u64)]
pub struct CreateProfile<'info> {
    #[account(mut)]
    pub guardian: Signer<'info>,

    #[account(
        mut,
        seeds = [NEXUS_SEED],
        bump = nexus.bump,
        has_one = guardian @ NexusError::NotAuthorized,
    )]
    pub nexus: Account<'info, NexusState>,

    #[account(seeds = [TIER_CONFIG_SEED], bump = tier_config.bump)]
    pub tier_config: Account<'info, TierConfig>,

    #[account(
        constraint = IdentityLink::accepts_mint(
            identity_mint.supply,
            identity_mint.decimals,
            identity_mint.mint_authority.is_some(),
        ) @ NexusError::InvalidIdentityMint,
    )]
    pub identity_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = guardian,
        space = 8 + AccountHandler::INIT_SPACE,
        seeds = [HANDLER_SEED, &identity_id.to_le_bytes()],
        bump,
    )]
    pub handler: Account<'info, AccountHandler>,

    #[account(
        init,
        payer = guardian,
        space = 8 + IdentityLink::INIT_SPACE,
        seeds = [IDENTITY_SEED, identity_mint.key().as_ref()],
        bump,
    )]
    pub identity_link: Account<'info, IdentityLink>,

    #[account(seeds = [VAULT_SEED, handler.key().as_ref()], bump)]
    pub vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
