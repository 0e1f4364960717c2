//! Modulator: turns a source raster into one field of composite signal.
//!
//! Every scan line gets its blanking structure first (equalizing pulses,
//! the vertical sync block, or a normal porch/sync/burst pattern), then
//! the active video region is filled with bandlimited luma plus
//! QAM-modulated chroma.

use crate::{
    common::{Reset, ResetKind},
    crt::Crt,
    error::{EmptySourceSnafu, Result, SourceTooSmallSnafu},
    signal::{
        cc_phase, AV_BEG, AV_LEN, BLACK_LEVEL, BLANK_LEVEL, BURST_LEVEL, BW_BEG, CB_BEG,
        CB_CYCLES, CC_SEQ, CRT_CB_FREQ, CRT_HRES, CRT_LINES, CRT_TOP, CRT_VRES, SYNC_BEG,
        SYNC_LEVEL, WHITE_LEVEL,
    },
};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use tracing::trace;

/// Field parity. Odd fields shift the vertical sync block by half a line,
/// which is how an interlaced receiver tells the two fields apart.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use]
pub enum Field {
    #[default]
    Even,
    Odd,
}

impl Field {
    pub const fn flip(self) -> Self {
        match self {
            Self::Even => Self::Odd,
            Self::Odd => Self::Even,
        }
    }

    pub(crate) const fn index(self) -> i32 {
        match self {
            Self::Even => 0,
            Self::Odd => 1,
        }
    }
}

impl From<usize> for Field {
    fn from(value: usize) -> Self {
        if value & 1 == 1 {
            Self::Odd
        } else {
            Self::Even
        }
    }
}

/// One source raster handed to the modulator.
#[derive(Debug, Copy, Clone)]
#[must_use]
pub struct NtscInput<'a> {
    /// Packed `0x00RRGGBB` pixels, row-major, no stride.
    pub rgb: &'a [u32],
    pub w: usize,
    pub h: usize,
    /// Which interlaced field this raster becomes.
    pub field: Field,
    /// Emit color burst and modulate chroma; otherwise the field is
    /// monochrome and carries no burst.
    pub as_color: bool,
}

/// Percent-of-line boundaries for the two pulse-patterned line shapes.
/// Regions alternate sync/blank starting with sync.
const EQUALIZING: [i32; 4] = [4, 50, 54, 100];
const VSYNC_EVEN: [i32; 4] = [46, 50, 96, 100];
const VSYNC_ODD: [i32; 4] = [4, 50, 96, 100];

fn pulse_pattern(line: &mut [i8], bounds: &[i32; 4]) {
    let mut t = 0usize;
    for (region, stop) in bounds.iter().enumerate() {
        let stop = (stop * CRT_HRES / 100) as usize;
        let level = if region & 1 == 0 { SYNC_LEVEL } else { BLANK_LEVEL };
        while t < stop {
            line[t] = level as i8;
            t += 1;
        }
    }
}

impl Crt {
    /// Modulates `input` into the analog signal buffer as one field.
    pub fn encode(&mut self, input: &NtscInput<'_>) -> Result<()> {
        #[cfg(feature = "profiling")]
        puffin::profile_function!();

        ensure!(
            input.w > 0 && input.h > 0,
            EmptySourceSnafu {
                width: input.w,
                height: input.h
            }
        );
        let expected = input.w * input.h;
        ensure!(
            input.rgb.len() >= expected,
            SourceTooSmallSnafu {
                expected,
                found: input.rgb.len(),
                width: input.w,
                height: input.h
            }
        );

        // Slight overscan: the picture is scaled onto a bit less than the
        // full active region, then centered.
        let destw = (AV_LEN * 55500) >> 16;
        let desth = (CRT_LINES * 63500) >> 16;
        // keep the start of active video on a carrier cycle boundary
        let xo = (AV_BEG + 4 + (AV_LEN - destw) / 2) & !3;
        let yo = CRT_TOP + 4 + (CRT_LINES - desth) / 2;

        for n in 0..CRT_VRES {
            let line = self.analog.line_mut(n);
            if n <= 3 || (7..=9).contains(&n) {
                // equalizing pulses: small blips of sync, mostly blank
                pulse_pattern(line, &EQUALIZING);
            } else if (4..=6).contains(&n) {
                // vertical sync block: mostly sync, half-line shifted on
                // odd fields
                let bounds = match input.field {
                    Field::Even => &VSYNC_EVEN,
                    Field::Odd => &VSYNC_ODD,
                };
                pulse_pattern(line, bounds);
            } else {
                // normal line: front porch, sync tip, blank through the
                // back porch
                let mut t = 0usize;
                while t < SYNC_BEG as usize {
                    line[t] = BLANK_LEVEL as i8;
                    t += 1;
                }
                while t < BW_BEG as usize {
                    line[t] = SYNC_LEVEL as i8;
                    t += 1;
                }
                while t < AV_BEG as usize {
                    line[t] = BLANK_LEVEL as i8;
                    t += 1;
                }
                if n < CRT_TOP {
                    while t < CRT_HRES as usize {
                        line[t] = BLANK_LEVEL as i8;
                        t += 1;
                    }
                }
                if input.as_color {
                    // ten cycles of carrier on the back porch
                    for t in CB_BEG..CB_BEG + CB_CYCLES * CRT_CB_FREQ {
                        let cb = CC_SEQ[(t & 3) as usize];
                        line[t as usize] = (BLANK_LEVEL + cb * BURST_LEVEL) as i8;
                    }
                }
            }
        }

        let w = input.w as i32;
        let h = input.h as i32;
        // half-line vertical shear between the two fields
        let field_offset = (input.field.index() * h + desth) / desth / 2;

        for y in 0..desth {
            let sy_a = ((y * h) / desth + field_offset).clamp(0, h - 1);
            let sy_b = ((y * h + desth / 2) / desth + field_offset).clamp(0, h - 1);

            self.iir_y.reset(ResetKind::Soft);
            self.iir_i.reset(ResetKind::Soft);
            self.iir_q.reset(ResetKind::Soft);

            let ph = cc_phase(y + yo);
            let row = self.analog.line_mut(y + yo);
            for x in 0..destw {
                let sx = (x * w) / destw;
                let pa = input.rgb[(sx + sy_a * w) as usize];
                let pb = input.rgb[(sx + sy_b * w) as usize];
                let (ra, ga, ba) = unpack(pa);
                let (rb, gb, bb) = unpack(pb);

                // RGB to YIQ; the two vertically adjacent source pixels are
                // summed, not averaged, feeding the bandlimit filters with
                // double vertical samples
                let fy = (19595 * ra + 38470 * ga + 7471 * ba + 19595 * rb + 38470 * gb
                    + 7471 * bb)
                    >> 15;
                let fi = (39059 * ra - 18022 * ga - 21103 * ba + 39059 * rb - 18022 * gb
                    - 21103 * bb)
                    >> 15;
                let fq = (13894 * ra - 34275 * ga + 20382 * ba + 13894 * rb - 34275 * gb
                    + 20382 * bb)
                    >> 15;

                let (ci, cq) = if input.as_color {
                    (CC_SEQ[(x & 3) as usize], CC_SEQ[((x + 3) & 3) as usize])
                } else {
                    (0, 0)
                };
                let fy = self.iir_y.step(fy);
                let fi = self.iir_i.step(fi) * ph * ci;
                let fq = self.iir_q.step(fq) * ph * cq;

                let mut ire = BLACK_LEVEL + self.black_point;
                ire += ((fy + fi + fq) * (WHITE_LEVEL * self.white_point / 100)) >> 10;
                row[(x + xo) as usize] = ire.clamp(0, 110) as i8;
            }
        }

        trace!(field = ?input.field, color = input.as_color, "modulated field");
        Ok(())
    }
}

const fn unpack(p: u32) -> (i32, i32, i32) {
    (
        (p >> 16 & 0xff) as i32,
        (p >> 8 & 0xff) as i32,
        (p & 0xff) as i32,
    )
}
