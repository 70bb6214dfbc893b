//! Request, cancellation, fixed and service fees; settings updates

use tranche_common::{Address, LifecycleState, LoanInstrument, PoolError, PoolSettings};
use tranche_integration_tests::*;

fn fee_settings() -> PoolSettings {
    PoolSettings {
        request_fee_bps: 500,
        request_cancellation_fee_bps: 100,
        ..settings(5_000)
    }
}

#[test]
fn test_request_and_cancellation_fees_burn_shares() {
    let mut h = Harness::activated(fee_settings());
    let a = h.lender(1_000_000);

    assert_eq!(h.pool.max_redeem_request(h.now, &a), 952_380);
    assert_eq!(h.pool.preview_redeem_request(100_000), 105_000);

    let receipt = h.pool.request_redeem(h.now, &a, 100_000).unwrap();
    assert_eq!(receipt.fee_shares, 5_000);
    assert_eq!(receipt.eligible_period, 1);
    assert_eq!(h.pool.balance_of(&a), 995_000);
    assert_eq!(h.pool.max_request_cancellation(h.now, &a), 100_000);

    let cancel = h.pool.cancel_redeem_request(h.now, &a, 50_000).unwrap();
    assert_eq!(cancel.fee_shares, 500);
    assert_eq!(cancel.split.from_requested, 50_000);
    assert_eq!(cancel.split.from_eligible, 0);
    assert_eq!(h.pool.balance_of(&a), 994_500);
    assert_eq!(h.pool.total_supply(), 994_500);

    assert_eq!(
        h.pool.cancel_redeem_request(h.now, &a, 60_000),
        Err(PoolError::InvalidCancellation)
    );
    assert_eq!(h.pool.max_request_cancellation(h.now, &a), 50_000);
}

#[test]
fn test_cancel_reaches_into_eligible_after_boundary() {
    let mut h = Harness::activated(PoolSettings {
        withdraw_gate_bps: 0,
        ..fee_settings()
    });
    let a = h.lender(1_000_000);
    h.pool.request_redeem(h.now, &a, 10_000).unwrap();

    // A closed gate leaves everything eligible
    h.next_period();
    let state = h.pool.withdraw_state(h.now, &a);
    assert_eq!(state.eligible_shares, 10_000);
    assert_eq!(state.redeemable_shares, 0);

    let cancel = h.pool.cancel_redeem_request(h.now, &a, 10_000).unwrap();
    assert_eq!(cancel.split.from_eligible, 10_000);
    assert_eq!(cancel.fee_shares, 100);
    assert_eq!(h.pool.withdraw_state(h.now, &a).committed_shares(), 0);
    assert!(h.pool.invariants_hold());
}

#[test]
fn test_fixed_fee_schedule() {
    let mut h = Harness::activated(PoolSettings {
        fixed_fee: 1_000,
        fixed_fee_interval: PERIOD,
        ..settings(5_000)
    });
    let admin = h.admin;
    let _a = h.lender(1_000_000);

    assert_eq!(h.pool.claim_fixed_fee(h.now, &admin), Err(PoolError::FeeNotDue));

    h.advance(PERIOD);
    assert_eq!(h.pool.claim_fixed_fee(h.now, &Address::new_unique()), Err(PoolError::Unauthorized));
    assert_eq!(h.pool.claim_fixed_fee(h.now, &admin), Ok(1_000));
    assert_eq!(h.pool.claim_fixed_fee(h.now, &admin), Err(PoolError::FeeNotDue));
    assert_eq!(h.token.balance_of(&admin), 1_000);
    assert_eq!(h.pool.total_assets(h.now), 999_000);

    h.advance(PERIOD);
    assert_eq!(h.pool.claim_fixed_fee(h.now, &admin), Ok(1_000));
}

#[test]
fn test_service_fee_is_held_for_admin() {
    let mut h = Harness::activated(PoolSettings {
        service_fee_bps: 500,
        ..settings(5_000)
    });
    let admin = h.admin;
    let _a = h.lender(1_000_000);
    let loan = h.loan(500_000, 4_166, 6);

    h.advance(PERIOD);
    let receipt = h
        .pool
        .receive_loan_payment(h.now, &loan.address(), 4_166, 0)
        .unwrap();
    loan.record_payment();
    assert_eq!(receipt.service_fee, 208);
    assert_eq!(receipt.interest_to_pool, 3_958);
    assert_eq!(h.pool.service_fees(), 208);

    // Fees sit on the pool's token account but outside the reserve
    assert_eq!(h.token.balance_of(&h.pool.address()), 500_000 + 4_166);
    assert_eq!(h.pool.liquidity_pool_assets(h.now), 500_000 + 3_958);

    let outsider = Address::new_unique();
    assert_eq!(h.pool.withdraw_fees(h.now, &outsider, 208, &outsider), Err(PoolError::Unauthorized));
    h.pool.withdraw_fees(h.now, &admin, 208, &admin).unwrap();
    assert_eq!(h.token.balance_of(&admin), 208);
    assert_eq!(
        h.pool.withdraw_fees(h.now, &admin, 1, &admin),
        Err(PoolError::InsufficientBalance)
    );
}

#[test]
fn test_fee_terms_lock_at_activation() {
    let mut h = Harness::new(settings(5_000));
    let admin = h.admin;
    assert_eq!(h.pool.lifecycle(h.now), LifecycleState::Initialized);

    h.pool.set_request_fee(h.now, &admin, 300).unwrap();
    h.pool.set_request_cancellation_fee(h.now, &admin, 50).unwrap();
    assert_eq!(h.pool.set_request_fee(h.now, &admin, 10_001), Err(PoolError::InvalidSettings));
    assert_eq!(
        h.pool.set_request_fee(h.now, &Address::new_unique(), 100),
        Err(PoolError::Unauthorized)
    );
    assert_eq!(h.pool.settings().request_fee_bps, 300);

    h.fund_first_loss(FIRST_LOSS);
    assert_eq!(
        h.pool.set_request_fee(h.now, &admin, 100),
        Err(PoolError::InvalidLifecycleState)
    );

    // These stay adjustable while the pool runs
    h.pool.set_withdraw_gate(h.now, &admin, 2_000).unwrap();
    h.pool.set_service_fee_bps(h.now, &admin, 100).unwrap();
    assert_eq!(h.pool.settings().withdraw_gate_bps, 2_000);
}

#[test]
fn test_capacity_and_end_date_updates() {
    let mut h = Harness::activated(settings(5_000));
    let admin = h.admin;
    let _a = h.lender(1_000_000);
    let end = h.pool.settings().end_date;

    assert_eq!(
        h.pool.set_pool_capacity(h.now, &admin, 999_999),
        Err(PoolError::InvalidSettings)
    );
    h.pool.set_pool_capacity(h.now, &admin, 1_500_000).unwrap();
    assert_eq!(h.pool.max_deposit(h.now, &admin), 500_000);

    assert_eq!(h.pool.set_pool_end_date(h.now, &admin, end + 1), Err(PoolError::InvalidSettings));
    assert_eq!(h.pool.set_pool_end_date(h.now, &admin, h.now - 1), Err(PoolError::InvalidSettings));

    h.close();
    assert_eq!(h.pool.lifecycle(h.now), LifecycleState::Closed);
    assert_eq!(h.pool.max_deposit(h.now, &admin), 0);
    assert_eq!(
        h.pool.set_withdraw_gate(h.now, &admin, 1_000),
        Err(PoolError::InvalidLifecycleState)
    );
}
