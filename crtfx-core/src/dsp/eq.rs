//! Three-band equalizer.
//!
//! Two cascaded 4-stage one-pole low-pass sections split the input into
//! low/mid/high bands; a 3-sample delay line compensates the group delay of
//! the cascades so the bands stay aligned when summed back with their gains.

use crate::{
    common::{Reset, ResetKind},
    dsp::math::{sincos14, T14_PI},
};
use serde::{Deserialize, Serialize};

/// Q16 fixed point for coefficients and band gains.
const EQ_P: i64 = 16;
const EQ_R: i64 = 1 << (EQ_P - 1);
/// Raw-input delay matching the cascade group delay.
const HIST_LEN: usize = 3;

#[derive(Default, Debug, Copy, Clone, Serialize, Deserialize)]
#[must_use]
pub struct Equalizer {
    /// Q16 low/high section coefficients.
    lf: i32,
    hf: i32,
    /// Q16 gains for the low, mid, and high bands.
    g: [i32; 3],
    f_lo: [i32; 4],
    f_hi: [i32; 4],
    h: [i32; HIST_LEN],
}

impl Equalizer {
    /// Splits at `f_lo`/`f_hi` (cutoffs in line-sample units against
    /// `rate`), with Q16 band gains.
    pub const fn new(f_lo: i32, f_hi: i32, rate: i32, g_lo: i32, g_mid: i32, g_hi: i32) -> Self {
        let (sn, _) = sincos14(T14_PI * f_lo / rate);
        let lf = 2 * (sn << 1);
        let (sn, _) = sincos14(T14_PI * f_hi / rate);
        let hf = 2 * (sn << 1);
        Self {
            lf,
            hf,
            g: [g_lo, g_mid, g_hi],
            f_lo: [0; 4],
            f_hi: [0; 4],
            h: [0; HIST_LEN],
        }
    }

    pub fn step(&mut self, s: i32) -> i32 {
        let lf = i64::from(self.lf);
        let hf = i64::from(self.hf);

        self.f_lo[0] += ((lf * i64::from(s - self.f_lo[0]) + EQ_R) >> EQ_P) as i32;
        self.f_hi[0] += ((hf * i64::from(s - self.f_hi[0]) + EQ_R) >> EQ_P) as i32;
        for i in 1..4 {
            self.f_lo[i] += ((lf * i64::from(self.f_lo[i - 1] - self.f_lo[i]) + EQ_R) >> EQ_P) as i32;
            self.f_hi[i] += ((hf * i64::from(self.f_hi[i - 1] - self.f_hi[i]) + EQ_R) >> EQ_P) as i32;
        }

        let bands = [
            self.f_lo[3],
            self.f_hi[3] - self.f_lo[3],
            self.h[HIST_LEN - 1] - self.f_hi[3],
        ];
        let mut out = 0;
        for (band, gain) in bands.iter().zip(self.g.iter()) {
            out += ((i64::from(*band) * i64::from(*gain)) >> EQ_P) as i32;
        }

        for i in (1..HIST_LEN).rev() {
            self.h[i] = self.h[i - 1];
        }
        self.h[0] = s;
        out
    }
}

impl Reset for Equalizer {
    fn reset(&mut self, _kind: ResetKind) {
        self.f_lo = [0; 4];
        self.f_hi = [0; 4];
        self.h = [0; HIST_LEN];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{khz_to_line, CRT_HRES};

    const UNITY: i32 = 1 << 16;

    fn luma_eq() -> Equalizer {
        Equalizer::new(khz_to_line(1500), khz_to_line(3000), CRT_HRES, UNITY, 8192, 9175)
    }

    #[test]
    fn unity_gains_make_a_pure_delay() {
        // the three bands telescope back to the delayed raw input
        let mut eq = Equalizer::new(khz_to_line(80), khz_to_line(1000), CRT_HRES, UNITY, UNITY, UNITY);
        let input = [12, -7, 100, 0, 55, -127, 33, 2, -90, 64];
        let mut output = Vec::new();
        for s in input {
            output.push(eq.step(s));
        }
        assert_eq!(&output[HIST_LEN..], &input[..input.len() - HIST_LEN]);
    }

    #[test]
    fn zeroed_high_band_suppresses_fast_edges() {
        // chroma EQ kills the high band entirely
        let mut eq = Equalizer::new(khz_to_line(80), khz_to_line(1000), CRT_HRES, UNITY, UNITY, 0);
        let mut alternating = 0;
        for n in 0..256 {
            let s = if n & 1 == 0 { 100 } else { -100 };
            alternating = alternating.max(eq.step(s).abs());
        }
        assert!(alternating < 100, "max response {alternating}");
    }

    #[test]
    fn dc_passes_through_low_band() {
        let mut eq = luma_eq();
        let mut out = 0;
        for _ in 0..CRT_HRES {
            out = eq.step(100);
        }
        // low gain is unity, mid/high settle to zero at DC
        assert!((90..=110).contains(&out), "settled at {out}");
    }

    #[test]
    fn reset_restores_quiescence() {
        let mut eq = luma_eq();
        for s in 0..32 {
            eq.step(s * 3);
        }
        eq.reset(ResetKind::Soft);
        let mut fresh = luma_eq();
        assert_eq!(eq.step(77), fresh.step(77));
        assert_eq!(eq.step(-5), fresh.step(-5));
    }
}
