//! Integer approximations of sine/cosine and e^x.
//!
//! Angles live on a 14-bit circle (16384 is a full turn) and exponentials
//! in Q11 fixed point. Both are exact enough for filter design and carrier
//! generation while staying in 32-bit integer arithmetic.

/// Full turn (2π) of the 14-bit angle unit.
pub const T14_2PI: i32 = 16384;
pub const T14_MASK: i32 = T14_2PI - 1;
pub const T14_PI: i32 = T14_2PI / 2;

/// Q11 fixed-point scale used by [`expx`].
pub const EXP_P: i32 = 11;
/// 1.0 in Q11.
pub const EXP_ONE: i32 = 1 << EXP_P;
pub const EXP_MASK: i32 = EXP_ONE - 1;
/// π in Q11.
pub const EXP_PI: i32 = 6434;

pub(crate) const fn exp_mul(x: i32, y: i32) -> i32 {
    x.wrapping_mul(y) >> EXP_P
}

pub(crate) const fn exp_div(x: i32, y: i32) -> i32 {
    (x << EXP_P) / y
}

/// Significant points on a quarter sine wave (15-bit amplitudes). The entry
/// past π/2 is duplicated so interpolation never indexes out of bounds.
const QUARTER_SIN15: [i32; 18] = [
    0x0000, 0x0c88, 0x18f8, 0x2528, 0x30f8, 0x3c56, 0x4726, 0x5150, 0x5a80, 0x62f0, 0x6a68,
    0x70e0, 0x7640, 0x7a78, 0x7d88, 0x7f60, 0x8000, 0x7f60,
];

/// Table sine for angles in `[0, π/2]`, interpolating on the low 8 bits.
const fn sintab8(n: i32) -> i32 {
    let f = n & 0xff;
    let i = (n >> 8 & 0xff) as usize;
    let a = QUARTER_SIN15[i];
    let b = QUARTER_SIN15[i + 1];
    a + ((b - a) * f >> 8)
}

/// 14-bit interpolated sine/cosine. Returns signed 15-bit `(sin, cos)`;
/// the other three quadrants come from reflection and negation.
pub const fn sincos14(n: i32) -> (i32, i32) {
    let n = n & T14_MASK;
    let h = n & (T14_PI - 1);

    let (sn, cs) = if h > (T14_2PI >> 2) - 1 {
        (sintab8(T14_PI - h), -sintab8(h - (T14_2PI >> 2)))
    } else {
        (sintab8(h), sintab8((T14_2PI >> 2) - h))
    };
    if n > T14_PI - 1 {
        (-sn, -cs)
    } else {
        (sn, cs)
    }
}

/// e^0..e^4 in Q11, for range reduction.
const E11: [i32; 5] = [EXP_ONE, 5567, 15133, 41135, 111817];

/// Fixed-point e^x for a Q11 argument.
///
/// The integer part is range-reduced against [`E11`]; the fraction is a
/// Taylor tail truncated when the next term underflows or the factorial
/// wraps. Large positive arguments overflow silently; the filter design
/// code only ever passes bounded negative values.
pub const fn expx(n: i32) -> i32 {
    if n == 0 {
        return EXP_ONE;
    }
    let neg = n < 0;
    let mut n = if neg { -n } else { n };

    let idx = n >> EXP_P;
    let mut res = EXP_ONE;
    let mut i = 0;
    while i < idx / 4 {
        res = exp_mul(res, E11[4]);
        i += 1;
    }
    let idx = idx & 3;
    if idx > 0 {
        res = exp_mul(res, E11[idx as usize]);
    }

    n &= EXP_MASK;
    let mut nxt = EXP_ONE;
    let mut acc = 0;
    let mut del = 1i32;
    let mut i = 1;
    while i < 17 {
        acc += nxt / del;
        nxt = exp_mul(nxt, n);
        del = del.wrapping_mul(i);
        if del > nxt || nxt <= 0 || del < 0 {
            break;
        }
        i += 1;
    }
    res = exp_mul(res, acc);

    if neg {
        res = exp_div(EXP_ONE, res);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sincos_cardinal_points() {
        assert_eq!(sincos14(0), (0, 0x8000));
        assert_eq!(sincos14(T14_2PI / 4), (0x8000, 0));
        assert_eq!(sincos14(T14_PI), (0, -0x8000));
        assert_eq!(sincos14(3 * T14_2PI / 4), (-0x8000, 0));
    }

    #[test]
    fn sincos_periodic() {
        for n in [0, 1, 137, 4096, 9000, 16383] {
            assert_eq!(sincos14(n), sincos14(n + T14_2PI));
            assert_eq!(sincos14(n), sincos14(n - T14_2PI));
        }
    }

    #[test]
    fn sincos_quadrant_symmetry() {
        for n in (0..T14_2PI).step_by(61) {
            let (sn, cs) = sincos14(n);
            let (sn_r, cs_r) = sincos14(T14_PI - n);
            assert_eq!(sn, sn_r, "sin(π−x) = sin(x) at {n}");
            assert_eq!(cs, -cs_r, "cos(π−x) = −cos(x) at {n}");
        }
    }

    #[test]
    fn sincos_amplitude_bounded() {
        for n in 0..T14_2PI {
            let (sn, cs) = sincos14(n);
            assert!((-0x8000..=0x8000).contains(&sn));
            assert!((-0x8000..=0x8000).contains(&cs));
        }
    }

    #[test]
    fn exp_known_values() {
        assert_eq!(expx(0), EXP_ONE);
        // e in Q11
        assert_eq!(expx(EXP_ONE), 5567);
        // 1/e in Q11 = 2048²/5567
        assert_eq!(expx(-EXP_ONE), 753);
        // e² via the reduction table
        assert_eq!(expx(2 * EXP_ONE), 15133);
    }

    #[test]
    fn exp_monotonic_over_filter_range() {
        // the IIR design evaluates expx on arguments in (-π, 0]
        let mut prev = expx(-EXP_PI);
        for n in (-EXP_PI + 1)..=0 {
            let cur = expx(n);
            assert!(cur >= prev, "e^x must not decrease ({n})");
            prev = cur;
        }
    }

    #[test]
    fn exp_reciprocal_pairs() {
        for n in [EXP_ONE / 2, EXP_ONE, 3 * EXP_ONE / 2, 3000] {
            let pos = expx(n);
            let neg = expx(-n);
            let product = (pos as i64 * neg as i64) >> EXP_P;
            assert!(
                (product - i64::from(EXP_ONE)).abs() <= 8,
                "e^x · e^-x ≈ 1, got {product} for {n}"
            );
        }
    }
}
