//! Fixed-point DSP primitives shared by the modulator and demodulator.

pub mod eq;
pub mod iir;
pub mod math;
