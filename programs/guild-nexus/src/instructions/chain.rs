use anchor_lang::prelude::*;

use crate::{
    constants::MAX_REFERRAL_DEPTH,
    errors::NexusError,
    referral::{self, Ancestor, Link},
    state::{AccountHandler, TierConfig, TierTransition},
};

/// Deserializes the ancestor handlers passed as remaining accounts, nearest
/// generation first.
pub(crate) fn load_chain<'info>(
    infos: &'info [AccountInfo<'info>],
    writable: bool,
) -> Result<Vec<Account<'info, AccountHandler>>> {
    require!(
        infos.len() <= MAX_REFERRAL_DEPTH,
        NexusError::ReferralChainTooLong
    );

    infos
        .iter()
        .map(|info| {
            require!(!writable || info.is_writable, NexusError::AncestorNotWritable);
            Account::<AccountHandler>::try_from(info)
        })
        .collect()
}

fn as_ancestors<'a, 'info>(chain: &'a mut [Account<'info, AccountHandler>]) -> Vec<Ancestor<'a>> {
    chain
        .iter_mut()
        .map(|account| Ancestor {
            key: account.key(),
            handler: &mut **account,
        })
        .collect()
}

pub(crate) fn as_links(chain: &[Account<AccountHandler>]) -> Vec<Link> {
    chain
        .iter()
        .map(|account| Link::of(account.key(), account))
        .collect()
}

fn persist_chain(chain: &[Account<AccountHandler>]) -> Result<()> {
    for account in chain {
        account.exit(&crate::ID)?;
    }
    Ok(())
}

/// Attaches `account` under `referrer` and writes the updated ancestors back.
/// Returns the number of ancestors credited.
pub(crate) fn attach_with_chain<'info>(
    account_key: Pubkey,
    account: &mut AccountHandler,
    referrer: Pubkey,
    config: &TierConfig,
    remaining: &'info [AccountInfo<'info>],
) -> Result<usize> {
    let mut chain = load_chain(remaining, true)?;
    referral::attach(
        account_key,
        account,
        referrer,
        config,
        &mut as_ancestors(&mut chain),
    )?;
    persist_chain(&chain)?;
    Ok(chain.len())
}

/// Moves `account`'s rank in every ancestor and writes them back.
pub(crate) fn propagate_tier_change<'info>(
    account: &AccountHandler,
    config: &TierConfig,
    transition: TierTransition,
    remaining: &'info [AccountInfo<'info>],
) -> Result<()> {
    let mut chain = load_chain(remaining, true)?;
    referral::on_tier_changed(account, config, transition, &mut as_ancestors(&mut chain))?;
    persist_chain(&chain)
}
