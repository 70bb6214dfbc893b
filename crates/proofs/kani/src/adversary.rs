//! Adversarial step sequences against the model pool

use crate::sanitizer::N_PARTICIPANTS;
use pool_model::ModelPool;

/// One action any participant or keeper can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Request { who: u8, shares: u32 },
    Crank,
    Claim { who: u8, limit: u8 },
    Redeem { who: u8 },
}

#[cfg(kani)]
impl kani::Arbitrary for Step {
    fn any() -> Self {
        let tag: u8 = kani::any();
        match tag % 4 {
            0 => Step::Request {
                who: kani::any(),
                shares: kani::any(),
            },
            1 => Step::Crank,
            2 => Step::Claim {
                who: kani::any(),
                limit: kani::any(),
            },
            _ => Step::Redeem { who: kani::any() },
        }
    }
}

/// Apply one step; `period` advances on every crank
///
/// A crank that fails on arithmetic leaves the pool untouched.
pub fn adversary_step(m: &mut ModelPool, period: &mut u64, step: Step) {
    let idx = |who: u8| (who as usize) % N_PARTICIPANTS;
    match step {
        Step::Request { who, shares } => {
            m.request(idx(who), *period, shares as u128);
        }
        Step::Crank => {
            let before = m.clone();
            if m.crank(*period).is_err() {
                *m = before;
            }
            *period = period.saturating_add(1);
        }
        Step::Claim { who, limit } => m.claim(idx(who), limit as u64),
        Step::Redeem { who } => {
            m.redeem_all(idx(who));
        }
    }
}
