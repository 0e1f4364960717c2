//! The virtual CRT receiver.
//!
//! A [`Crt`] is one television: it owns the sampled signal buffers, the
//! sync trackers and burst reference that give the receiver its lock
//! behavior, the noise generator, the per-instance filter state, and the
//! output frame.

use crate::{
    common::{Reset, ResetKind},
    decode::Lcg,
    dsp::{eq::Equalizer, iir::LowPass},
    encode::Field,
    error::{EmptyRasterSnafu, Result},
    signal::{khz_to_line, SignalBuffer, CRT_HRES, I_FREQ, L_FREQ, Q_FREQ, Y_FREQ},
};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::ops::{Deref, DerefMut};

/// Output raster: packed `0x00RRGGBB`, row-major, no stride.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct Frame(Vec<u32>);

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({} pixels)", self.0.len())
    }
}

impl Frame {
    fn new(len: usize) -> Self {
        Self(vec![0x00; len])
    }
}

impl Deref for Frame {
    type Target = [u32];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Frame {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// One virtual receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use]
pub struct Crt {
    pub(crate) outw: i32,
    pub(crate) outh: i32,
    pub(crate) frame: Frame,

    /// Chroma gain applied during demodulation.
    pub saturation: i32,
    pub brightness: i32,
    pub contrast: i32,
    pub black_point: i32,
    pub white_point: i32,

    // Sync positions carried across fields. Their stability from frame to
    // frame is the receiver's lock; never cleared between decodes.
    pub(crate) hsync: i32,
    pub(crate) vsync: i32,
    /// Field parity recovered from the last decode.
    pub(crate) field: Field,

    /// Composite signal as generated.
    pub(crate) analog: SignalBuffer,
    /// Composite signal after noise injection, the demodulator's input.
    pub(crate) inp: SignalBuffer,

    /// Color burst reference, one accumulator per carrier phase.
    pub(crate) ccref: [i32; 4],
    /// Noise generator; persists so successive frames draw fresh noise.
    pub(crate) rng: Lcg,

    // Modulator bandlimiters, reset per active-video row.
    pub(crate) iir_y: LowPass,
    pub(crate) iir_i: LowPass,
    pub(crate) iir_q: LowPass,
    // Demodulator equalizers, reset per decoded line.
    pub(crate) eq_y: Equalizer,
    pub(crate) eq_i: Equalizer,
    pub(crate) eq_q: Equalizer,
}

impl Crt {
    /// Creates a receiver producing an `outw` × `outh` raster.
    pub fn new(outw: usize, outh: usize) -> Result<Self> {
        let mut crt = Self {
            outw: 0,
            outh: 0,
            frame: Frame::new(0),
            saturation: 0,
            brightness: 0,
            contrast: 0,
            black_point: 0,
            white_point: 0,
            hsync: 0,
            vsync: 0,
            field: Field::Even,
            analog: SignalBuffer::default(),
            inp: SignalBuffer::default(),
            ccref: [0; 4],
            rng: Lcg::default(),
            iir_y: LowPass::new(L_FREQ, Y_FREQ),
            iir_i: LowPass::new(L_FREQ, I_FREQ),
            iir_q: LowPass::new(L_FREQ, Q_FREQ),
            eq_y: Equalizer::new(khz_to_line(1500), khz_to_line(3000), CRT_HRES, 65536, 8192, 9175),
            eq_i: Equalizer::new(khz_to_line(80), khz_to_line(1150), CRT_HRES, 65536, 65536, 1311),
            eq_q: Equalizer::new(khz_to_line(80), khz_to_line(1000), CRT_HRES, 65536, 65536, 0),
        };
        crt.resize(outw, outh)?;
        crt.reset(ResetKind::Soft);
        Ok(crt)
    }

    /// Rebinds the output geometry. Filter design and sync state carry over.
    pub fn resize(&mut self, outw: usize, outh: usize) -> Result<()> {
        ensure!(
            outw > 0 && outh > 0,
            EmptyRasterSnafu {
                width: outw,
                height: outh
            }
        );
        self.outw = outw as i32;
        self.outh = outh as i32;
        self.frame = Frame::new(outw * outh);
        Ok(())
    }

    /// The decoded output raster, packed `0x00RRGGBB` row-major.
    #[must_use]
    pub fn frame(&self) -> &[u32] {
        &self.frame
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.outw as usize
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.outh as usize
    }

    /// Field parity recovered by the last decode.
    pub const fn field(&self) -> Field {
        self.field
    }
}

impl Reset for Crt {
    fn reset(&mut self, kind: ResetKind) {
        self.saturation = 18;
        self.brightness = 0;
        self.contrast = 179;
        self.black_point = 0;
        self.white_point = 100;
        self.hsync = 0;
        self.vsync = 0;
        if kind == ResetKind::Hard {
            self.field = Field::Even;
            self.analog.reset(kind);
            self.inp.reset(kind);
            self.frame.fill(0);
            self.ccref = [0; 4];
            self.rng = Lcg::default();
        }
    }
}
