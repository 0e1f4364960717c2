//! Demodulator: develops the sampled composite signal into the output
//! raster.
//!
//! Decoding is stateful on purpose. The sync trackers and the burst
//! reference converge over successive lines and frames, which is what
//! makes the picture "roll in" and lock the way a real set does.

use crate::{
    common::{Reset, ResetKind},
    crt::Crt,
    encode::Field,
    signal::{
        AV_BEG, AV_LEN, BLACK_LEVEL, CB_BEG, CB_CYCLES, CRT_BOT, CRT_CB_FREQ, CRT_HRES,
        CRT_INPUT_SIZE, CRT_LINES, CRT_TOP, CRT_VRES, SYNC_BEG, SYNC_LEVEL,
    },
};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Lines inspected around the last vertical sync position.
const VSYNC_WINDOW: i32 = 8;
/// Samples inspected around the last horizontal sync position.
const HSYNC_WINDOW: i32 = 8;

/// Fixed linear congruential generator driving noise injection. Seed and
/// recurrence are part of the receiver's observable behavior: the state
/// carries across fields so every frame draws fresh noise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Lcg {
    rn: u32,
}

impl Default for Lcg {
    fn default() -> Self {
        Self { rn: 194 }
    }
}

impl Lcg {
    /// Middle byte of the next state, `0..=255`.
    fn next(&mut self) -> i32 {
        self.rn = self.rn.wrapping_mul(214_019).wrapping_add(140_327_895);
        (self.rn >> 16 & 0xff) as i32
    }
}

/// Scratch samples for one demodulated line.
#[derive(Default, Debug, Copy, Clone)]
struct Yiq {
    y: i32,
    i: i32,
    q: i32,
}

const SCRATCH_LEN: usize = AV_LEN as usize + 1;

impl Crt {
    /// Decodes the current signal into the output frame, injecting `noise`
    /// amplitude of generator noise beforehand. The new picture is blended
    /// 50/50 with the previous frame.
    pub fn decode(&mut self, noise: u8) {
        #[cfg(feature = "profiling")]
        puffin::profile_function!();

        let noise = i32::from(noise);

        for i in 0..CRT_INPUT_SIZE {
            let s = i32::from(self.analog[i]) + ((self.rng.next() - 0x7f) * noise >> 8);
            self.inp[i] = s.clamp(-127, 127) as i8;
        }
        self.ccref = [0; 4];

        // Vertical sync: integrate candidate lines near the previous lock
        // until one dips below the threshold. The long vsync pulse is the
        // only region that integrates this far down.
        let mut vsync_line = self.vsync;
        let mut crossing = CRT_HRES;
        'vsync: for i in -VSYNC_WINDOW..VSYNC_WINDOW {
            vsync_line = (self.vsync + i).rem_euclid(CRT_VRES);
            let base = vsync_line * CRT_HRES;
            let mut sum = 0;
            crossing = 0;
            while crossing < CRT_HRES {
                sum += self.inp.sample(base + crossing);
                if sum <= 100 * SYNC_LEVEL {
                    break 'vsync;
                }
                crossing += 1;
            }
        }
        self.vsync = vsync_line;
        // a pulse landing in the back half of the line means an odd field
        self.field = Field::from(usize::from(crossing > CRT_HRES / 2));
        trace!(vsync = self.vsync, field = ?self.field, "field sync");

        // beam energy bounds for the bloom model
        let max_e = (128 + noise / 2) * AV_LEN;
        let mut prev_e = 16384 / 8;

        // vertical scale from signal lines to output rows
        let ratio = (self.outh + CRT_LINES / 2) / CRT_LINES;
        let field_offset = self.field.index() * (ratio / 2);

        let bright = self.brightness - (BLACK_LEVEL + self.black_point);
        let mut scratch = [Yiq::default(); SCRATCH_LEN];

        for line in CRT_TOP..CRT_BOT {
            let beg = (line - CRT_TOP) * self.outh / CRT_LINES + field_offset;
            let end = (line - CRT_TOP + 1) * self.outh / CRT_LINES + field_offset;
            if beg >= self.outh {
                continue;
            }
            let end = end.min(self.outh);

            // horizontal sync, searched the same way as vertical but over
            // a much shorter pulse
            let ln = (line + self.vsync).rem_euclid(CRT_VRES) * CRT_HRES;
            let base = ln + self.hsync + SYNC_BEG;
            let mut sum = 0;
            let mut i = -HSYNC_WINDOW;
            while i < HSYNC_WINDOW {
                sum += self.inp.sample(base + i);
                if sum <= 4 * SYNC_LEVEL {
                    break;
                }
                i += 1;
            }
            self.hsync = (self.hsync + i).rem_euclid(CRT_HRES);

            // Burst recovery: fold this line's burst into the 4-phase
            // reference. The 127/128 leak makes it an exponential average
            // that converges over several lines.
            let burst_base = ln + (self.hsync & !3);
            for t in CB_BEG..CB_BEG + CB_CYCLES * CRT_CB_FREQ {
                let p = self.ccref[(t & 3) as usize] * 127 / 128;
                let n = self.inp.sample(burst_base + t);
                self.ccref[(t & 3) as usize] = p + n;
            }

            let xpos = (AV_BEG + self.hsync).rem_euclid(CRT_HRES);
            let ypos = (line + self.vsync).rem_euclid(CRT_VRES);
            let pos = xpos + ypos * CRT_HRES;
            let phasealign = (pos & 3) as usize;

            // carrier amplitude is saturation, phase difference is hue
            let dci = self.ccref[(phasealign + 1) & 3] - self.ccref[(phasealign + 3) & 3];
            let dcq = self.ccref[(phasealign + 2) & 3] - self.ccref[phasealign & 3];
            let wave = [
                -dcq * self.saturation,
                dci * self.saturation,
                dcq * self.saturation,
                -dci * self.saturation,
            ];

            // Bloom: a bright (high energy) scan overdrives the beam and
            // widens it, so the line renders narrower in sample terms.
            let mut energy = 0;
            for t in 0..AV_LEN {
                energy += self.inp.sample(pos + t);
            }
            prev_e = prev_e * 123 / 128 + ((max_e / 2 - energy) * 1024) / max_e;
            let line_w = AV_LEN * 112 / 128 + prev_e / 512;

            let dx = (line_w * 4096) / self.outw;
            let scan_l = (AV_LEN / 2 - line_w / 2 + 8) * 4096;
            let scan_r = (AV_LEN - 1) * 4096;

            self.eq_y.reset(ResetKind::Soft);
            self.eq_i.reset(ResetKind::Soft);
            self.eq_q.reset(ResetKind::Soft);

            for t in (scan_l >> 12).max(0)..scan_r >> 12 {
                let raw = self.inp.sample(pos + t);
                let cell = &mut scratch[t as usize];
                cell.y = self.eq_y.step(raw + bright) << 4;
                cell.i = self.eq_i.step(raw * wave[(t & 3) as usize] >> 9) >> 3;
                cell.q = self.eq_q.step(raw * wave[((t + 3) & 3) as usize] >> 9) >> 3;
            }

            // resample the line horizontally onto the destination row,
            // interpolating in Q12
            let row_start = (beg * self.outw) as usize;
            let row_end = row_start + self.outw as usize;
            let mut col = row_start;
            let mut sp = scan_l;
            while sp < scan_r && col < row_end {
                let rw = sp & 0xfff;
                let lw = 0xfff - rw;
                let s = (sp >> 12) as usize;
                let a = scratch[s];
                let b = scratch[s + 1];

                let y = (a.y * lw >> 2) + (b.y * rw >> 2);
                let i = (a.i * lw >> 14) + (b.i * rw >> 14);
                let q = (a.q * lw >> 14) + (b.q * rw >> 14);

                let r = ((y + 3879 * i + 2556 * q) >> 12) * self.contrast >> 8;
                let g = ((y - 1126 * i - 2605 * q) >> 12) * self.contrast >> 8;
                let b = ((y - 4530 * i + 7021 * q) >> 12) * self.contrast >> 8;

                let aa = (r.clamp(0, 255) as u32) << 16
                    | (g.clamp(0, 255) as u32) << 8
                    | b.clamp(0, 255) as u32;
                let bb = self.frame[col];
                // 50/50 blend with the previous frame; masking the channel
                // low bits keeps the shift from carrying across channels
                self.frame[col] = ((aa & 0xfe_feff) >> 1) + ((bb & 0xfe_feff) >> 1);
                col += 1;
                sp += dx;
            }

            // replicate the decoded row over the rest of its band
            for row in beg + 1..end {
                let dst = (row * self.outw) as usize;
                let src = dst - self.outw as usize;
                self.frame.copy_within(src..dst, dst);
            }
        }
    }
}
