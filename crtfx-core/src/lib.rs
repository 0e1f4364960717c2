#![doc = include_str!("../README.md")]

pub mod common;
pub mod crt;
pub mod decode;
pub mod dsp;
pub mod encode;
pub mod error;
pub mod signal;

pub mod prelude {
    //! Re-exports of the common types for driving a virtual CRT.

    pub use crate::{
        common::{Reset, ResetKind},
        crt::Crt,
        encode::{Field, NtscInput},
        error::{Error, Result},
        signal::{CRT_HRES, CRT_LINES, CRT_VRES},
    };
}
