//! Pipeline stages for ID-card generation.
//!
//! Each submodule implements exactly one step. The driver in
//! [`crate::generate`] runs them strictly in sequence.
//!
//! ## Data Flow
//!
//! ```text
//! template ──┐
//!            ├──▶ render (one page per valid row) ──▶ document
//! records ───┘        │
//!                     └── photo ──▶ encode
//! ```
//!
//! 1. [`template`] — decode, flatten and resize the background once
//! 2. [`records`]  — parse the roster CSV into trimmed rows
//! 3. [`photo`]    — resolve, decode and square one portrait
//! 4. [`encode`]   — Flate / JPEG buffers the PDF can embed directly
//! 5. [`render`]   — composite one card and apply the skip/degrade policy

pub mod encode;
pub mod photo;
pub mod records;
pub mod render;
pub mod template;
