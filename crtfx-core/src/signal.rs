//! Composite signal geometry and the sampled waveform buffer.
//!
//! One scan line is 63.5 µs sampled at four times the color subcarrier.
//! That puts 227.5 subcarrier cycles on a line, so successive lines are
//! 180° out of chroma phase — the source of the NTSC "dot crawl" look.

use crate::common::{Reset, ResetKind};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Samples per chroma carrier cycle.
pub const CRT_CB_FREQ: i32 = 4;
/// Samples per scan line (227.5 carrier cycles at 4 samples each).
pub const CRT_HRES: i32 = 910;
/// Scan lines per field.
pub const CRT_VRES: i32 = 262;
/// Samples in one field of signal.
pub const CRT_INPUT_SIZE: usize = (CRT_HRES * CRT_VRES) as usize;

/// First scan line carrying picture.
pub const CRT_TOP: i32 = 21;
/// One past the last scan line carrying picture.
pub const CRT_BOT: i32 = 261;
/// Picture lines per field.
pub const CRT_LINES: i32 = CRT_BOT - CRT_TOP;

// Composite amplitudes, in IRE.
pub const WHITE_LEVEL: i32 = 100;
pub const BURST_LEVEL: i32 = 20;
pub const BLACK_LEVEL: i32 = 7;
pub const BLANK_LEVEL: i32 = 0;
pub const SYNC_LEVEL: i32 = -40;

// Horizontal timing, in nanoseconds.
const FP_NS: i32 = 1500; // front porch
const SYNC_NS: i32 = 4700; // sync tip
const BW_NS: i32 = 600; // breezeway
const CB_NS: i32 = 2500; // color burst
const BP_NS: i32 = 1600; // back porch
const AV_NS: i32 = 52600; // active video
const HB_NS: i32 = FP_NS + SYNC_NS + BW_NS + CB_NS + BP_NS;
/// Full line duration.
pub const LINE_NS: i32 = HB_NS + AV_NS;

/// Nanosecond offset to its sample position on the line.
pub const fn ns2pos(ns: i32) -> i32 {
    ns * CRT_HRES / LINE_NS
}

pub const FP_BEG: i32 = ns2pos(0);
pub const SYNC_BEG: i32 = ns2pos(FP_NS);
pub const BW_BEG: i32 = ns2pos(FP_NS + SYNC_NS);
pub const CB_BEG: i32 = ns2pos(FP_NS + SYNC_NS + BW_NS);
pub const BP_BEG: i32 = ns2pos(FP_NS + SYNC_NS + BW_NS + CB_NS);
pub const AV_BEG: i32 = ns2pos(HB_NS);
pub const AV_LEN: i32 = ns2pos(AV_NS);

/// Carrier cycles in the color burst.
pub const CB_CYCLES: i32 = 10;

/// Line rate and per-component bandwidths, scaled 1/10 together.
pub const L_FREQ: i32 = 1_431_818;
pub const Y_FREQ: i32 = 420_000;
pub const I_FREQ: i32 = 150_000;
pub const Q_FREQ: i32 = 55_000;

/// Carrier sample sequence over one subcarrier cycle.
pub const CC_SEQ: [i32; 4] = [0, 1, 0, -1];

/// Per-line chroma phase sign; the half-cycle left over from 227.5 cycles
/// per line inverts the carrier on odd lines.
pub const fn cc_phase(line: i32) -> i32 {
    if line & 1 == 1 {
        -1
    } else {
        1
    }
}

/// kHz cutoff to line-sample units.
pub const fn khz_to_line(khz: i32) -> i32 {
    CRT_HRES * (khz * 100) / L_FREQ
}

/// One field of sampled composite signal: [`CRT_VRES`] scan lines of
/// [`CRT_HRES`] signed 8-bit samples, row-major.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct SignalBuffer(Vec<i8>);

impl std::fmt::Debug for SignalBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SignalBuffer({} samples)", self.0.len())
    }
}

impl Default for SignalBuffer {
    fn default() -> Self {
        Self(vec![0x00; CRT_INPUT_SIZE])
    }
}

impl Deref for SignalBuffer {
    type Target = [i8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SignalBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl SignalBuffer {
    pub fn line(&self, n: i32) -> &[i8] {
        let beg = n as usize * CRT_HRES as usize;
        &self.0[beg..beg + CRT_HRES as usize]
    }

    pub fn line_mut(&mut self, n: i32) -> &mut [i8] {
        let beg = n as usize * CRT_HRES as usize;
        &mut self.0[beg..beg + CRT_HRES as usize]
    }

    /// Sample at a raw field offset, widened for arithmetic. Reads past the
    /// end of the field (a sync search with a large phase error) wrap.
    pub fn sample(&self, pos: i32) -> i32 {
        i32::from(self.0[pos.rem_euclid(CRT_INPUT_SIZE as i32) as usize])
    }
}

impl Reset for SignalBuffer {
    fn reset(&mut self, _kind: ResetKind) {
        self.0.fill(0);
    }
}
