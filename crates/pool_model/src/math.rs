//! Safe arithmetic helpers - no unwrap, no panics

/// Basis point denominator (100% = 10_000 bps)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Add u128 with saturation at MAX
pub fn add_u128(a: u128, b: u128) -> u128 {
    a.saturating_add(b)
}

/// Subtract u128 with saturation at 0
pub fn sub_u128(a: u128, b: u128) -> u128 {
    a.saturating_sub(b)
}

/// Multiply u128 with saturation
pub fn mul_u128(a: u128, b: u128) -> u128 {
    a.saturating_mul(b)
}

/// Divide u128 (returns 0 if divisor is 0)
pub fn div_u128(a: u128, b: u128) -> u128 {
    if b == 0 {
        0
    } else {
        a / b
    }
}

/// Divide u128 rounding up (returns 0 if divisor is 0)
pub fn div_ceil_u128(a: u128, b: u128) -> u128 {
    if b == 0 {
        return 0;
    }
    let q = a / b;
    if a % b == 0 {
        q
    } else {
        q.saturating_add(1)
    }
}

/// Minimum of two u128
pub fn min_u128(a: u128, b: u128) -> u128 {
    if a < b { a } else { b }
}

/// Maximum of two u128
pub fn max_u128(a: u128, b: u128) -> u128 {
    if a > b { a } else { b }
}

const LO_MASK: u128 = (1u128 << 64) - 1;

/// Full 256-bit product of two u128 as (hi, lo)
///
/// Split into 64-bit limbs:
/// a * b = a_hi*b_hi*2^128 + (a_hi*b_lo + a_lo*b_hi)*2^64 + a_lo*b_lo
pub fn wide_mul(a: u128, b: u128) -> (u128, u128) {
    let a_hi = a >> 64;
    let a_lo = a & LO_MASK;
    let b_hi = b >> 64;
    let b_lo = b & LO_MASK;

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    // Middle column, at most 3 * (2^64 - 1)
    let mid = (ll >> 64) + (lh & LO_MASK) + (hl & LO_MASK);
    let lo = (ll & LO_MASK) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// (hi * 2^128 + lo) / d as (quotient, remainder)
///
/// Returns None when d is 0 or the quotient does not fit in u128.
pub fn wide_div(hi: u128, lo: u128, d: u128) -> Option<(u128, u128)> {
    if d == 0 || hi >= d {
        return None;
    }
    if hi == 0 {
        return Some((lo / d, lo % d));
    }

    // Restoring long division, one bit of `lo` at a time. `rem < d` holds
    // before every step, so `2 * rem + 1` fits in 129 bits.
    let mut rem = hi;
    let mut quot = 0u128;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quot |= 1u128 << i;
        }
    }
    Some((quot, rem))
}

/// floor(a * b / c), returns 0 if c is 0
///
/// Exact for every input whose result fits in u128; saturates otherwise.
pub fn mul_div_down(a: u128, b: u128, c: u128) -> u128 {
    if c == 0 {
        return 0;
    }
    match a.checked_mul(b) {
        Some(p) => p / c,
        None => {
            let (hi, lo) = wide_mul(a, b);
            match wide_div(hi, lo, c) {
                Some((q, _)) => q,
                None => u128::MAX,
            }
        }
    }
}

/// ceil(a * b / c), returns 0 if c is 0
pub fn mul_div_up(a: u128, b: u128, c: u128) -> u128 {
    if c == 0 {
        return 0;
    }
    match a.checked_mul(b) {
        Some(p) => div_ceil_u128(p, c),
        None => {
            let (hi, lo) = wide_mul(a, b);
            match wide_div(hi, lo, c) {
                Some((q, 0)) => q,
                Some((q, _)) => q.saturating_add(1),
                None => u128::MAX,
            }
        }
    }
}

/// floor(amount * bps / 10_000)
pub fn bps_of(amount: u128, bps: u128) -> u128 {
    mul_div_down(amount, bps, BPS_DENOMINATOR)
}

/// ceil(amount * bps / 10_000), used for every fee so rounding never favors the payer
pub fn fee_ceil(amount: u128, bps: u128) -> u128 {
    mul_div_up(amount, bps, BPS_DENOMINATOR)
}
