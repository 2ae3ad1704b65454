//! Translation file loading and dumping.
//!
//! A [`TranslationLoader`] or [`TranslationDumper`] is parameterized by a
//! [`FileFormat`](types::filetypes::FileFormat) marker; [`FormatKind`]
//! chooses the marker at run time from a file extension.

pub mod codec;
pub mod format;
pub mod types;
pub mod utils;

mod dumper;
mod loader;

pub use dumper::TranslationDumper;
pub use format::{FormatKind, convert};
pub use loader::TranslationLoader;
pub use types::error::{Result, TranslationError};
