//! Fill PDF forms and stamp PDFs through pdftk.
//!
//! The FDF encoder ([`fdf`], [`utf16`]) is the only part that touches a file
//! format. Everything else stages files in a scratch directory and hands them
//! to the external tool.

pub mod api;
pub mod error;
pub mod fdf;
pub mod ops;
pub mod pdftk;
pub mod process;
pub mod settings;
pub mod utf16;
pub mod workspace;

pub use error::{Error, Result};
pub use fdf::{CheckboxLexicon, FieldValue, Form};
