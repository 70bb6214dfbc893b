//! Multiple lenders sharing the same gate, permissioning and receivers

use tranche_common::{Address, PoolError};
use tranche_integration_tests::*;

#[test]
fn test_late_requester_shares_the_ration() {
    let mut h = Harness::activated(settings(2_500));
    let a = h.lender(1_000_000);
    let b = h.lender(1_000_000);

    h.request(&a, 1_000_000);
    let first = h.next_period().expect("snapshot");
    assert_eq!(first.served_shares, 500_000);

    // B joins the queue midway; the first snapshot does not apply to it
    h.request(&b, 1_000_000);
    assert_eq!(h.pool.unclaimed_snapshots(h.now, &b), 0);

    let second = h.next_period().expect("snapshot");
    assert_eq!(second.eligible_shares, 1_500_000);
    assert_eq!(second.served_shares, 375_000);

    let sa = h.pool.withdraw_state(h.now, &a);
    let sb = h.pool.withdraw_state(h.now, &b);
    assert_eq!(sa.redeemable_shares, 625_000);
    assert_eq!(sa.eligible_shares, 375_000);
    assert_eq!(sb.redeemable_shares, 250_000);
    assert_eq!(sb.eligible_shares, 750_000);

    assert_eq!(h.redeem_all(&a), 625_000);
    assert_eq!(h.redeem_all(&b), 250_000);
    assert!(h.pool.invariants_hold());
}

#[test]
fn test_spam_requests_do_not_grow_history() {
    let mut h = Harness::activated(settings(10_000));
    let honest = h.lender(1_000_000);
    let attacker = h.lender(100);
    h.request(&honest, 1_000_000);

    for _ in 0..6 {
        for _ in 0..10 {
            h.pool.request_redeem(h.now, &attacker, 1).unwrap();
            // The request already ran this period's admission
            assert!(h.pool.crank(h.now).unwrap().is_none());
        }
        h.advance(PERIOD);
    }
    h.pool.crank(h.now).unwrap();

    // One snapshot per period regardless of request count
    assert_eq!(h.pool.snapshots().len(), 6);
    assert_eq!(h.pool.unclaimed_snapshots(h.now, &honest), 6);

    let outcome = h.pool.claim_snapshots(h.now, &honest, 1).unwrap();
    assert_eq!(outcome.applied, 1);
    assert_eq!(h.pool.withdraw_state(h.now, &honest).redeemable_shares, 1_000_000);
    assert_eq!(h.redeem_all(&honest), 1_000_000);
}

#[test]
fn test_claim_limit_must_be_positive() {
    let mut h = Harness::activated(settings(5_000));
    let a = h.lender(1_000);
    assert_eq!(
        h.pool.claim_snapshots(h.now, &a, 0),
        Err(PoolError::InvalidAmount)
    );
}

#[test]
fn test_access_predicate_gates_entry() {
    let allowed = Address::new_unique();
    let stranger = Address::new_unique();
    let mut h = Harness::with_access(settings(5_000), Box::new(AllowList::new([allowed])));
    h.fund_first_loss(FIRST_LOSS);

    assert!(h.pool.max_deposit(h.now, &allowed) > 0);
    assert_eq!(h.pool.max_deposit(h.now, &stranger), 0);
    assert_eq!(h.pool.max_mint(h.now, &stranger), Ok(0));

    h.deposit(&allowed, 10_000);
    h.token.mint(&stranger, 10_000);
    assert_eq!(
        h.pool.deposit(h.now, &stranger, 10_000, &stranger),
        Err(PoolError::Unauthorized)
    );
    assert_eq!(
        h.pool.mint(h.now, &stranger, 10_000, &stranger),
        Err(PoolError::Unauthorized)
    );
    assert_eq!(h.token.balance_of(&stranger), 10_000);
    assert!(h.pool.request_redeem(h.now, &allowed, 1_000).is_ok());
}

#[test]
fn test_receiver_and_owner_must_be_caller() {
    let mut h = Harness::activated(settings(10_000));
    let a = h.lender(10_000);
    let other = Address::new_unique();
    h.token.mint(&a, 10_000);

    assert_eq!(
        h.pool.deposit(h.now, &a, 1_000, &other),
        Err(PoolError::Unauthorized)
    );

    h.request(&a, 5_000);
    h.next_period();
    assert_eq!(
        h.pool.redeem(h.now, &a, 5_000, &other, &a),
        Err(PoolError::Unauthorized)
    );
    assert_eq!(
        h.pool.redeem(h.now, &other, 5_000, &other, &a),
        Err(PoolError::Unauthorized)
    );
    assert_eq!(
        h.pool.withdraw(h.now, &a, 5_000, &a, &other),
        Err(PoolError::Unauthorized)
    );
    assert_eq!(h.pool.redeem(h.now, &a, 5_000, &a, &a), Ok(5_000));
}

#[test]
fn test_failed_transfer_leaves_pool_untouched() {
    let mut h = Harness::activated(settings(10_000));
    let a = h.lender(10_000);
    h.request(&a, 4_000);
    h.advance(PERIOD);

    h.token.set_paused(true);
    assert!(matches!(
        h.pool.redeem(h.now, &a, 4_000, &a, &a),
        Err(PoolError::Transfer(_))
    ));
    // Not even the lazy crank was committed
    assert!(h.pool.snapshots().is_empty());
    assert_eq!(h.pool.balance_of(&a), 10_000);

    h.token.set_paused(false);
    assert_eq!(h.pool.redeem(h.now, &a, 4_000, &a, &a), Ok(4_000));
    assert_eq!(h.pool.snapshots().len(), 1);
}
