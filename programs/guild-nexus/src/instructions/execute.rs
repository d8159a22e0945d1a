use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};
use anchor_lang::system_program::{self, Transfer};
use anchor_spl::token_interface::TokenAccount;

use crate::{
    constants::{
        HANDLER_SEED, MAX_BATCH_CALLS, NEXUS_SEED, OPERATION_CALL, OPERATION_CREATE,
        OPERATION_CREATE2, OPERATION_DELEGATECALL, VAULT_SEED,
    },
    errors::NexusError,
    events::CallExecuted,
    state::{AccountHandler, NexusState},
};

/// One outbound call made on behalf of the account.
///
/// Its accounts are taken from the remaining accounts in order: the target
/// first, then `account_count` accounts handed to the target program.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    pub target: Pubkey,
    pub value: u64,
    pub data: Vec<u8>,
    pub operation: u8,
    pub account_count: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// Nothing to move or run, only the nonce advances
    Empty,
    /// Lamports from the vault to the target
    Transfer,
    /// Cross-program invocation signed by the vault
    Invoke,
}

pub fn check_operation(operation: u8) -> Result<()> {
    match operation {
        OPERATION_CALL => Ok(()),
        OPERATION_DELEGATECALL | OPERATION_CREATE | OPERATION_CREATE2 => {
            err!(NexusError::UnsupportedOperation)
        }
        _ => err!(NexusError::InvalidOperation),
    }
}

pub fn classify(call: &CallRequest, target_executable: bool) -> Result<CallKind> {
    require_keys_neq!(call.target, crate::ID, NexusError::ReentrantCall);

    match (call.value > 0, call.data.is_empty()) {
        (false, true) => Ok(CallKind::Empty),
        (true, true) => {
            require!(!target_executable, NexusError::TargetRejectsValue);
            Ok(CallKind::Transfer)
        }
        (false, false) => Ok(CallKind::Invoke),
        (true, false) => err!(NexusError::TargetRejectsValue),
    }
}

/// The vault may be drained to zero, otherwise it must stay rent exempt.
pub fn vault_covers(balance: u64, rent_minimum: u64, value: u64) -> bool {
    value == balance || value.saturating_add(rent_minimum) <= balance
}

/// Takes the next `len` items after `cursor` and advances it.
pub fn next_window<'a, T>(items: &'a [T], cursor: &mut usize, len: usize) -> Result<&'a [T]> {
    let end = cursor
        .checked_add(len)
        .ok_or(NexusError::MissingCallAccount)?;
    let window = items
        .get(*cursor..end)
        .ok_or(NexusError::MissingCallAccount)?;
    *cursor = end;
    Ok(window)
}

fn dispatch<'info>(
    accounts: &mut Execute<'info>,
    call: &CallRequest,
    target: &AccountInfo<'info>,
    call_accounts: &[AccountInfo<'info>],
) -> Result<()> {
    // 1. Operation kind and target
    check_operation(call.operation)?;
    require_keys_eq!(target.key(), call.target, NexusError::MissingCallAccount);

    // 2. Every attempt consumes a nonce
    let nonce = accounts.handler.next_nonce()?;

    // 3. Value must be covered by the vault
    let kind = classify(call, target.executable)?;
    if call.value > 0 {
        let rent_minimum = Rent::get()?.minimum_balance(0);
        require!(
            vault_covers(accounts.vault.lamports(), rent_minimum, call.value),
            NexusError::InsufficientBalance
        );
    }

    let handler_key = accounts.handler.key();
    let vault_bump = [accounts.handler.vault_bump()];
    let signer_seeds: &[&[&[u8]]] = &[&[VAULT_SEED, handler_key.as_ref(), &vault_bump]];

    // 4. Run it
    match kind {
        CallKind::Empty => {}
        CallKind::Transfer => {
            system_program::transfer(
                CpiContext::new_with_signer(
                    accounts.system_program.to_account_info(),
                    Transfer {
                        from: accounts.vault.to_account_info(),
                        to: target.clone(),
                    },
                    signer_seeds,
                ),
                call.value,
            )?;
        }
        CallKind::Invoke => {
            let vault_key = accounts.vault.key();
            let metas = call_accounts
                .iter()
                .map(|info| AccountMeta {
                    pubkey: info.key(),
                    is_signer: info.is_signer || info.key() == vault_key,
                    is_writable: info.is_writable,
                })
                .collect();
            let instruction = Instruction {
                program_id: call.target,
                accounts: metas,
                data: call.data.clone(),
            };

            let mut infos = call_accounts.to_vec();
            infos.push(accounts.vault.to_account_info());
            infos.push(target.clone());
            invoke_signed(&instruction, &infos, signer_seeds)?;
        }
    }

    msg!(
        "Guild Nexus: {} call {} to {} with value {}",
        handler_key,
        nonce,
        call.target,
        call.value
    );
    emit!(CallExecuted {
        handler: handler_key,
        target: call.target,
        value: call.value,
        nonce,
    });

    Ok(())
}

/// Runs one call from the account vault.
pub fn execute<'info>(
    ctx: Context<'_, '_, 'info, 'info, Execute<'info>>,
    call: CallRequest,
) -> Result<()> {
    ctx.accounts.nexus.require_active()?;

    let mut cursor = 0;
    let target = next_window(ctx.remaining_accounts, &mut cursor, 1)?;
    let call_accounts = next_window(
        ctx.remaining_accounts,
        &mut cursor,
        call.account_count as usize,
    )?;

    dispatch(ctx.accounts, &call, &target[0], call_accounts)
}

/// Runs calls in order, any failure aborts the whole batch.
pub fn execute_batch<'info>(
    ctx: Context<'_, '_, 'info, 'info, Execute<'info>>,
    calls: Vec<CallRequest>,
) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    require!(
        !calls.is_empty() && calls.len() <= MAX_BATCH_CALLS,
        NexusError::InvalidBatchSize
    );

    let mut cursor = 0;
    for call in &calls {
        let target = next_window(ctx.remaining_accounts, &mut cursor, 1)?;
        let call_accounts = next_window(
            ctx.remaining_accounts,
            &mut cursor,
            call.account_count as usize,
        )?;
        dispatch(ctx.accounts, call, &target[0], call_accounts)?;
    }

    Ok(())
}

#[derive(Accounts)]
pub struct Execute<'info> {
    pub owner: Signer<'info>,

    #[account(seeds = [NEXUS_SEED], bump = nexus.bump)]
    pub nexus: Account<'info, NexusState>,

    #[account(
        mut,
        seeds = [HANDLER_SEED, &handler.identity_id().to_le_bytes()],
        bump = handler.bump(),
    )]
    pub handler: Account<'info, AccountHandler>,

    #[account(
        constraint = identity_token.mint == handler.identity_mint() @ NexusError::NotAccountOwner,
        constraint = identity_token.owner == owner.key() @ NexusError::NotAccountOwner,
        constraint = identity_token.amount == 1 @ NexusError::NotAccountOwner,
    )]
    pub identity_token: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [VAULT_SEED, handler.key().as_ref()],
        bump = handler.vault_bump(),
    )]
    pub vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
