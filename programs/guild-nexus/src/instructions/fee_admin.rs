use anchor_lang::prelude::*;

use crate::{
    constants::{FEE_SCHEDULE_SEED, NEXUS_SEED, REFERRAL_LAYERS, REFERRAL_TIERS},
    errors::NexusError,
    events::FeeScheduleUpdated,
    state::{FeeSchedule, NexusState, PartyFees, SeekerFees, SolverFees, Treasuries, TreasuryKind},
};

fn updated(custodian: Pubkey, field: &str) {
    msg!("Guild Nexus: fee schedule {} updated", field);
    emit!(FeeScheduleUpdated {
        custodian,
        field: field.to_string(),
    });
}

/// Writes the reference fee tables.
pub fn initialize_fee_schedule(
    ctx: Context<InitializeFeeSchedule>,
    custodian: Pubkey,
    treasuries: Treasuries,
) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    require!(custodian != Pubkey::default(), NexusError::InvalidAddress);

    ctx.accounts
        .fee_schedule
        .set_inner(FeeSchedule::reference(
            custodian,
            treasuries,
            ctx.bumps.fee_schedule,
        ));

    updated(custodian, "initialized");
    Ok(())
}

pub fn set_seeker_fees(ctx: Context<UpdateFeeSchedule>, fees: SeekerFees) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    ctx.accounts.fee_schedule.seeker = fees;
    updated(ctx.accounts.custodian.key(), "seeker fees");
    Ok(())
}

pub fn set_solver_fees(ctx: Context<UpdateFeeSchedule>, fees: SolverFees) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    ctx.accounts.fee_schedule.solver = fees;
    updated(ctx.accounts.custodian.key(), "solver fees");
    Ok(())
}

pub fn set_party_fees(ctx: Context<UpdateFeeSchedule>, fees: PartyFees) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    ctx.accounts.fee_schedule.party = fees;
    updated(ctx.accounts.custodian.key(), "party fees");
    Ok(())
}

/// Replaces the whole referral distribution table.
pub fn set_bulk_referral_rate(
    ctx: Context<UpdateFeeSchedule>,
    rates: [[u64; REFERRAL_LAYERS]; REFERRAL_TIERS],
) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    ctx.accounts.fee_schedule.referral_rates = rates;
    updated(ctx.accounts.custodian.key(), "referral rates");
    Ok(())
}

pub fn set_protocol_rates(
    ctx: Context<UpdateFeeSchedule>,
    dispute_deposit_rate: u64,
    referral_rewards_tax: u64,
) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    let schedule = &mut ctx.accounts.fee_schedule;
    schedule.dispute_deposit_rate = dispute_deposit_rate;
    schedule.referral_rewards_tax = referral_rewards_tax;
    updated(ctx.accounts.custodian.key(), "protocol rates");
    Ok(())
}

pub fn set_referral_rewards_revenue(ctx: Context<UpdateFeeSchedule>, rate: u64) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    ctx.accounts.fee_schedule.referral_rewards_revenue = rate;
    updated(ctx.accounts.custodian.key(), "referral rewards revenue");
    Ok(())
}

pub fn set_treasury(
    ctx: Context<UpdateFeeSchedule>,
    kind: TreasuryKind,
    address: Pubkey,
) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    let schedule = &mut ctx.accounts.fee_schedule;
    let previous = schedule.treasury(kind);
    schedule.set_treasury(kind, address)?;
    msg!(
        "Guild Nexus: {:?} treasury moved from {} to {}",
        kind,
        previous,
        schedule.treasury(kind)
    );
    updated(ctx.accounts.custodian.key(), "treasury");
    Ok(())
}

pub fn set_custodian(ctx: Context<UpdateFeeSchedule>, new_custodian: Pubkey) -> Result<()> {
    ctx.accounts.nexus.require_active()?;
    require!(
        new_custodian != Pubkey::default(),
        NexusError::InvalidAddress
    );
    ctx.accounts.fee_schedule.custodian = new_custodian;
    updated(new_custodian, "custodian");
    Ok(())
}

#[derive(Accounts)]
pub struct InitializeFeeSchedule<'info> {
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
        space = 8 + FeeSchedule::INIT_SPACE,
        seeds = [FEE_SCHEDULE_SEED],
        bump,
    )]
    pub fee_schedule: Account<'info, FeeSchedule>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UpdateFeeSchedule<'info> {
    pub custodian: Signer<'info>,

    #[account(seeds = [NEXUS_SEED], bump = nexus.bump)]
    pub nexus: Account<'info, NexusState>,

    #[account(
        mut,
        seeds = [FEE_SCHEDULE_SEED],
        bump = fee_schedule.bump,
        has_one = custodian @ NexusError::NotAuthorized,
    )]
    pub fee_schedule: Account<'info, FeeSchedule>,
}
