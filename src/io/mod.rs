//! I/O utilities for reading and writing spectrum files.
//!
//! The crate does not fetch or decode vendor reports. Upstream tooling
//! converts those into the plain-text layout documented on
//! [`read_spectrum_file`], one record per observation time.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use buoy_spectra::io::read_spectrum_file;
//!
//! let series = read_spectrum_file(Path::new("100p1.txt")).unwrap();
//! for record in series.records() {
//!     println!("{}: {} bands", record.time, record.spectrum.len());
//! }
//! ```

mod spectrum_reader;

pub use spectrum_reader::{
    SpectrumFileError, parse_spectra, read_spectrum_file, write_spectrum_file,
};
