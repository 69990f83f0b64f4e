//! # webpify
//!
//! Convert textual images (base64 data URLs) to WebP, optionally resizing on
//! the way. Inputs may be PNG, JPEG, or WebP; output is always a lossless
//! `data:image/webp;base64,...` string.
//!
//! # Architecture: One Pipeline, Shared Runtimes
//!
//! ```text
//! data URL → transcode → classify → decode → [resize] → encode → data URL
//! ```
//!
//! Every stage is a plain function over owned buffers. The codec state each
//! stage needs lives in a [`imaging::Runtimes`] registry: each runtime is built
//! the first time it is needed and shared by every later call, including calls
//! racing from several threads.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Format detection, base64 transcoding, decode/resize/encode stages, codec runtimes |
//! | [`pipeline`] | Wires the stages together; [`convert`] is the one-call entry point |
//! | [`request`] | JSON request contract (`image`, `width`, `height`, `fitMethod`) and its validation |
//! | [`batch`] | Parallel directory conversion with per-file outcomes |
//! | [`config`] | `config.toml` loading, validation, merging onto stock defaults |
//! | [`error`] | [`ConvertError`] and its client/internal split |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Lossless WebP Only
//!
//! The encoder is the `image` crate's pure-Rust lossless WebP writer. Output
//! is pixel-exact with the (possibly resized) decoded image, and there is no
//! quality knob to configure.
//!
//! ## Declared Format First
//!
//! By default the media type in the data URL header decides the decoder, and
//! an unsupported declaration fails before any base64 decoding. Setting
//! `sniffing.mode = "content"` switches to magic-byte detection so mislabeled
//! and header-less payloads still convert.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling, and encoding all come from the `image`
//! crate. The binary has no system image library dependencies.

pub mod batch;
pub mod config;
pub mod error;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod request;

pub use error::ConvertError;
pub use imaging::{DataUrl, FitMethod};
pub use pipeline::{ConvertedImage, Pipeline, PipelineOptions, convert};

#[cfg(test)]
pub(crate) mod test_helpers;
