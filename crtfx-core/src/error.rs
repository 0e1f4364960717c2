//! Error handling.

use snafu::Snafu;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Snafu, Debug)]
#[must_use]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("output raster must be non-empty (got {width}x{height})"))]
    EmptyRaster { width: usize, height: usize },
    #[snafu(display("source raster must be non-empty (got {width}x{height})"))]
    EmptySource { width: usize, height: usize },
    #[snafu(display(
        "source buffer holds {found} pixels but a {width}x{height} raster needs {expected}"
    ))]
    SourceTooSmall {
        expected: usize,
        found: usize,
        width: usize,
        height: usize,
    },
}
