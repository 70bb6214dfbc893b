//! Concrete proofs pinning the gated admission sequence

use pool_model::*;

/// 25% gate on a 1:1 pool: each period serves a quarter of what is liquid
#[kani::proof]
fn quarter_gate_first_two_periods() {
    let mut m = ModelPool::new(2_500);
    let idx = match m.join(1_000_000) {
        Some(i) => i,
        None => return,
    };
    m.request(idx, 0, 1_000_000);

    let boundary = m.crank(0);
    kani::assert(matches!(boundary, Ok(None)), "request admitted before its boundary");

    let first = m.crank(1);
    kani::assert(
        matches!(first, Ok(Some(s)) if s.served_shares == 250_000 && s.served_assets == 250_000),
        "first period should serve 250000",
    );

    let second = m.crank(2);
    kani::assert(
        matches!(second, Ok(Some(s)) if s.served_shares == 187_500 && s.served_assets == 187_500),
        "second period should serve 187500",
    );
    kani::assert(model_ok(&m), "model invariants broken");
}

/// Full redemption after a complete admission empties the pipeline
#[kani::proof]
fn full_gate_redeems_everything() {
    let mut m = ModelPool::new(10_000);
    let idx = match m.join(1_000) {
        Some(i) => i,
        None => return,
    };
    m.request(idx, 0, 1_000);
    let _ = m.crank(1);

    let paid = m.redeem_all(idx);
    kani::assert(paid == 1_000, "complete admission should pay everything");
    kani::assert(m.total_supply == 0 && m.liquid == 0, "pool not emptied");
}
