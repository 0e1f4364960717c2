//! Single-pole IIR low-pass, used to bandlimit Y/I/Q before modulation.

use crate::{
    common::{Reset, ResetKind},
    dsp::math::{exp_mul, expx, EXP_ONE, EXP_PI},
};
use serde::{Deserialize, Serialize};

/// First-order RC low-pass discretized in Q11.
#[derive(Default, Debug, Copy, Clone, Serialize, Deserialize)]
#[must_use]
pub struct LowPass {
    /// Q11 coefficient, in (0, 1).
    c: i32,
    /// History/accumulator.
    h: i32,
}

impl LowPass {
    /// Designs a low-pass passing `limit` out of a total bandwidth `freq`.
    pub const fn new(freq: i32, limit: i32) -> Self {
        let rate = (freq << 9) / limit;
        Self {
            c: EXP_ONE - expx(-((EXP_PI << 9) / rate)),
            h: 0,
        }
    }

    pub fn step(&mut self, s: i32) -> i32 {
        self.h += exp_mul(s - self.h, self.c);
        self.h
    }
}

impl Reset for LowPass {
    fn reset(&mut self, _kind: ResetKind) {
        self.h = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{I_FREQ, L_FREQ, Q_FREQ, Y_FREQ};

    #[test]
    fn coefficient_in_unit_range() {
        for limit in [Y_FREQ, I_FREQ, Q_FREQ] {
            let f = LowPass::new(L_FREQ, limit);
            assert!(f.c > 0 && f.c < EXP_ONE, "c = {} for limit {limit}", f.c);
        }
    }

    #[test]
    fn wider_cutoff_reacts_faster() {
        let y = LowPass::new(L_FREQ, Y_FREQ);
        let q = LowPass::new(L_FREQ, Q_FREQ);
        assert!(y.c > q.c);
    }

    #[test]
    fn settles_to_dc() {
        let mut f = LowPass::new(L_FREQ, Y_FREQ);
        let mut out = 0;
        for _ in 0..64 {
            out = f.step(1000);
        }
        assert!((990..=1000).contains(&out), "settled at {out}");
    }

    #[test]
    fn reset_clears_history_only() {
        let mut f = LowPass::new(L_FREQ, I_FREQ);
        let c = f.c;
        f.step(500);
        assert_ne!(f.h, 0);
        f.reset(ResetKind::Soft);
        assert_eq!(f.h, 0);
        assert_eq!(f.c, c);
    }
}
