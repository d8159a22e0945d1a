use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions::ID as INSTRUCTIONS_SYSVAR_ID;
use anchor_spl::token_interface::TokenAccount;

use crate::{
    constants::HANDLER_SEED,
    errors::NexusError,
    instructions::chain::{as_links, load_chain},
    referral,
    signature::{check_signature, check_signer},
    state::AccountHandler,
};

/// Returns the valid-signature magic when the identity holder signed
/// `digest` in the preceding Ed25519 instruction, zero otherwise.
pub fn is_valid_signature(
    ctx: Context<SignatureQuery>,
    digest: [u8; 32],
    signature: Vec<u8>,
) -> Result<u32> {
    let owner = ctx.accounts.identity_token.owner;
    let check = check_signature(
        &ctx.accounts.instructions_sysvar.to_account_info(),
        &owner,
        &digest,
        &signature,
    )?;
    Ok(check.magic())
}

/// Returns the valid-signer magic when `candidate` holds the identity token.
pub fn is_valid_signer(
    ctx: Context<SignatureQuery>,
    candidate: Pubkey,
    _context: Vec<u8>,
) -> Result<u32> {
    let owner = ctx.accounts.identity_token.owner;
    Ok(check_signer(&owner, &candidate).magic())
}

/// Whether `candidate` is the ancestor exactly `depth` generations up. The
/// intermediate ancestors are passed as remaining accounts.
pub fn check_ancestor_at<'info>(
    ctx: Context<'_, '_, 'info, 'info, AncestorQuery<'info>>,
    depth: u8,
    candidate: Pubkey,
) -> Result<bool> {
    let chain = load_chain(ctx.remaining_accounts, false)?;
    referral::check_ancestor_at(depth, candidate, &ctx.accounts.handler, &as_links(&chain))
}

#[derive(Accounts)]
pub struct SignatureQuery<'info> {
    #[account(
        seeds = [HANDLER_SEED, &handler.identity_id().to_le_bytes()],
        bump = handler.bump(),
    )]
    pub handler: Account<'info, AccountHandler>,

    /// Resolves the live owner of the account
    #[account(
        constraint = identity_token.mint == handler.identity_mint() @ NexusError::NotAccountOwner,
        constraint = identity_token.amount == 1 @ NexusError::NotAccountOwner,
    )]
    pub identity_token: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: address constrained to the instructions sysvar
    #[account(address = INSTRUCTIONS_SYSVAR_ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,
}

#[derive(Accounts)]
pub struct AncestorQuery<'info> {
    #[account(
        seeds = [HANDLER_SEED, &handler.identity_id().to_le_bytes()],
        bump = handler.bump(),
    )]
    pub handler: Account<'info, AccountHandler>,
}
