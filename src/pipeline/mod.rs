//! Pipeline stages for image-to-PDF conversion.
//!
//! Each submodule implements exactly one step, so each is testable alone.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ cleanup ──▶ ocr
//! (source dir)  (convert)   (ocrmypdf)
//!                  │           │
//!                  └─ temp.tiff┘
//! ```
//!
//! 1. [`discover`]: list eligible images and derive output paths
//! 2. [`stage`]   : build command lines and run the external tools
//! 3. [`temp`]    : per-file intermediate TIFF, deleted on drop

pub mod discover;
pub mod stage;
pub mod temp;
