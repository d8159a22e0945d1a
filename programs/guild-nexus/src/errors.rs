use anchor_lang::prelude::*;

#[error_code]
pub enum NexusError {
    #[msg("Caller is not authorized for this operation")]
    NotAuthorized,

    #[msg("Signer does not hold the identity token of this account")]
    NotAccountOwner,

    #[msg("Protocol is paused")]
    ProtocolPaused,

    #[msg("Identity id is not the next id in sequence")]
    IdentityOutOfSequence,

    #[msg("Identity mint must have a supply of one, zero decimals and no mint authority")]
    InvalidIdentityMint,

    #[msg("Account already has a referrer")]
    AlreadyLinked,

    #[msg("An account cannot refer itself")]
    SelfReferral,

    #[msg("Invalid depth")]
    InvalidDepth,

    #[msg("Invalid referred address")]
    InvalidAddress,

    #[msg("Referral chain ended before the requested depth")]
    ReferralChainExhausted,

    #[msg("Referral chain account does not match the expected ancestor")]
    BrokenReferralChain,

    #[msg("Referral chain is missing an ancestor within the depth cap")]
    MissingAncestor,

    #[msg("Referral chain is longer than the depth cap")]
    ReferralChainTooLong,

    #[msg("Referral chain account must be writable")]
    AncestorNotWritable,

    #[msg("Tier count underflow in referral aggregate")]
    TierCountUnderflow,

    #[msg("Can't increase the tier")]
    NotEligible,

    #[msg("Tier upgrade condition not met")]
    ConditionNotMet,

    #[msg("New tier must be above the current tier")]
    InvalidTransition,

    #[msg("Tier is outside the configured ladder")]
    TierOutOfRange,

    #[msg("Rank bands must be non-decreasing and within 1..=5")]
    InvalidRankBands,

    #[msg("Value exceeds the account balance")]
    InsufficientBalance,

    #[msg("Only call operations are supported")]
    UnsupportedOperation,

    #[msg("Unknown operation kind")]
    InvalidOperation,

    #[msg("Target cannot receive value with this call")]
    TargetRejectsValue,

    #[msg("Call target or account was not supplied")]
    MissingCallAccount,

    #[msg("Batch is empty or exceeds the maximum number of calls")]
    InvalidBatchSize,

    #[msg("Account cannot call back into this program")]
    ReentrantCall,

    #[msg("Experience account must be the vault's XP token account")]
    InvalidExperienceAccount,

    #[msg("Fee components exceed the amount")]
    FeesExceedAmount,

    #[msg("Arithmetic overflow")]
    MathOverflow,
}

#[cfg(test)]
pub(crate) fn assert_nexus_error<T: std::fmt::Debug>(result: Result<T>, expected: NexusError) {
    assert_eq!(result.unwrap_err(), anchor_lang::error::Error::from(expected));
}
