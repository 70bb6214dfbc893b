//! Loan funding, repayment, defaults and the first-loss buffer

use tranche_common::memory::MemoryLoan;
use tranche_common::{Address, LifecycleState, LoanInstrument, LoanState, PoolError};
use tranche_integration_tests::*;

#[test]
fn test_activation_waits_for_first_loss_minimum() {
    let mut h = Harness::new(settings(5_000));
    let a = Address::new_unique();
    h.token.mint(&a, 1_000);

    assert!(!h.fund_first_loss(FIRST_LOSS / 2));
    assert_eq!(h.pool.lifecycle(h.now), LifecycleState::Initialized);
    assert_eq!(h.pool.current_period(h.now), None);
    assert_eq!(h.pool.max_deposit(h.now, &a), 0);
    assert_eq!(
        h.pool.deposit(h.now, &a, 1_000, &a),
        Err(PoolError::InvalidLifecycleState)
    );
    assert_eq!(h.pool.crank(h.now), Err(PoolError::ClockAnomaly));

    assert!(h.fund_first_loss(FIRST_LOSS / 2));
    assert_eq!(h.pool.lifecycle(h.now), LifecycleState::Active);
    assert_eq!(h.pool.current_period(h.now), Some(0));
    assert_eq!(h.pool.first_loss_balance(), FIRST_LOSS);
    assert_eq!(h.pool.deposit(h.now, &a, 1_000, &a), Ok(1_000));
}

#[test]
fn test_fund_and_repay_loan() {
    let mut h = Harness::activated(settings(5_000));
    let _a = h.lender(1_000_000);
    let loan = h.loan(500_000, 4_166, 6);
    let addr = loan.address();

    assert!(h.pool.is_funded_loan(&addr));
    assert_eq!(h.token.balance_of(&addr), 500_000 + 4_166 * 6);
    assert_eq!(h.pool.liquidity_pool_assets(h.now), 500_000);
    assert_eq!(h.pool.total_assets(h.now), 1_000_000);

    // Interest accrues straight-line through the payment period
    h.advance(PERIOD / 2);
    assert_eq!(h.pool.current_expected_interest(h.now), 2_083);
    h.advance(PERIOD / 2);
    assert_eq!(h.pool.total_assets(h.now), 1_004_166);

    let stranger = Address::new_unique();
    assert_eq!(
        h.pool.receive_loan_payment(h.now, &stranger, 4_166, 0),
        Err(PoolError::Unauthorized)
    );
    assert_eq!(
        h.pool.receive_loan_payment(h.now, &addr, 0, 500_001),
        Err(PoolError::InvalidAmount)
    );

    let receipt = h.pool.receive_loan_payment(h.now, &addr, 4_166, 0).unwrap();
    loan.record_payment();
    assert!(!receipt.retired);
    // The paid interest moves from accrued to liquid
    assert_eq!(h.pool.total_assets(h.now), 1_004_166);
    assert_eq!(h.pool.liquidity_pool_assets(h.now), 504_166);

    let last = h.pool.receive_loan_payment(h.now, &addr, 4_166, 500_000).unwrap();
    assert!(last.retired);
    assert!(!h.pool.is_funded_loan(&addr));
    assert_eq!(h.pool.total_assets(h.now), 1_008_332);
}

#[test]
fn test_fund_loan_checks() {
    let mut h = Harness::activated(settings(5_000));
    let admin = h.admin;
    let _a = h.lender(1_000_000);

    let big = MemoryLoan::new(2_000_000, 1, 1, PERIOD);
    assert_eq!(
        h.pool.fund_loan(h.now, &admin, big.instrument()),
        Err(PoolError::InsufficientLiquidity)
    );

    let drawn = MemoryLoan::new(1_000, 1, 1, PERIOD);
    drawn.set_state(LoanState::Active);
    assert_eq!(
        h.pool.fund_loan(h.now, &admin, drawn.instrument()),
        Err(PoolError::InvalidLoanState)
    );

    let ok = MemoryLoan::new(1_000, 1, 1, PERIOD);
    assert_eq!(
        h.pool.fund_loan(h.now, &Address::new_unique(), ok.instrument()),
        Err(PoolError::Unauthorized)
    );
    h.pool.fund_loan(h.now, &admin, ok.instrument()).unwrap();
    assert_eq!(
        h.pool.fund_loan(h.now, &admin, ok.instrument()),
        Err(PoolError::InvalidLoanState)
    );
}

#[test]
fn test_default_draws_first_loss_then_lenders() {
    println!("========================================");
    println!("Default: 500,000 principal vs 100,000 first loss");
    println!("========================================");

    let mut h = Harness::activated(settings(5_000));
    let admin = h.admin;
    let a = h.lender(1_000_000);
    let loan = h.loan(500_000, 4_166, 6);
    let addr = loan.address();

    h.advance(PERIOD);
    let report = h.pool.default_loan(h.now, &admin, &addr).unwrap();
    println!(
        "  written off {}, first loss {}, uncovered {}",
        report.written_off, report.first_loss_applied, report.uncovered
    );
    assert_eq!(report.written_off, 500_000);
    assert_eq!(report.first_loss_applied, 100_000);
    assert_eq!(report.uncovered, 400_000);

    assert!(!h.pool.is_funded_loan(&addr));
    assert_eq!(h.pool.first_loss_balance(), 0);
    assert_eq!(h.token.balance_of(&h.pool.address()), 600_000);
    assert_eq!(h.pool.total_assets(h.now), 600_000);
    assert_eq!(h.pool.convert_to_assets(h.now, h.pool.balance_of(&a)), Ok(600_000));

    assert_eq!(
        h.pool.default_loan(h.now, &admin, &addr),
        Err(PoolError::InvalidLoanState)
    );
    assert_eq!(
        h.pool.receive_loan_payment(h.now, &addr, 4_166, 0),
        Err(PoolError::Unauthorized)
    );
}

#[test]
fn test_small_default_is_fully_covered() {
    let mut h = Harness::activated(settings(5_000));
    let admin = h.admin;
    let a = h.lender(1_000_000);
    let loan = h.loan(60_000, 500, 3);

    let report = h.pool.default_loan(h.now, &admin, &loan.address()).unwrap();
    assert_eq!(report.first_loss_applied, 60_000);
    assert_eq!(report.uncovered, 0);
    assert_eq!(h.pool.first_loss_balance(), 40_000);
    assert_eq!(h.pool.convert_to_assets(h.now, h.pool.balance_of(&a)), Ok(1_000_000));
}

#[test]
fn test_first_loss_released_after_wind_down() {
    let mut h = Harness::activated(settings(5_000));
    let admin = h.admin;
    let _a = h.lender(1_000_000);
    let loan = h.loan(10_000, 100, 1);

    assert_eq!(
        h.pool.withdraw_first_loss(h.now, &admin, FIRST_LOSS, &admin),
        Err(PoolError::InvalidLifecycleState)
    );

    h.close();
    assert_eq!(
        h.pool.withdraw_first_loss(h.now, &admin, FIRST_LOSS, &admin),
        Err(PoolError::InvalidLoanState)
    );

    h.pool
        .receive_loan_payment(h.now, &loan.address(), 100, 10_000)
        .unwrap();
    assert_eq!(
        h.pool.withdraw_first_loss(h.now, &admin, FIRST_LOSS + 1, &admin),
        Err(PoolError::InsufficientBalance)
    );
    h.pool
        .withdraw_first_loss(h.now, &admin, FIRST_LOSS, &admin)
        .unwrap();
    assert_eq!(h.token.balance_of(&admin), FIRST_LOSS);
    assert_eq!(h.pool.first_loss_balance(), 0);
}
