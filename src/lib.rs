//! A library for writing Apple style chapter tracks and metadata into MPEG-4 audio files.
//!
//! The input is an AAC audio source, either an M4A/MP4 container or a raw ADTS stream. The
//! output is a new M4A file carrying the original audio payload byte-exact, a timed text
//! chapter track (with optional per-chapter hyperlinks), an optional timed image chapter track,
//! a Nero style chapter list, and iTunes style metadata tags.
//!
//! # Examples
//!
//! ## Muxing chapters into a file
//! ```no_run
//! use mp4chap::{MetadataSet, MuxRequest, TextChapter};
//!
//! let request = MuxRequest::new()
//!     .with_chapters(vec![
//!         TextChapter::new(0, "Intro"),
//!         TextChapter::with_href(120_000, "Chapter 2", "https://example.com"),
//!     ])
//!     .with_metadata(MetadataSet {
//!         title: Some("My Audiobook".to_owned()),
//!         ..Default::default()
//!     });
//!
//! mp4chap::mux_file("input.m4a", "output.m4a", &request).unwrap();
//! ```
//!
//! ## Inspecting a file's audio track
//! ```no_run
//! let parsed = mp4chap::parse_mp4_file("input.m4a").unwrap();
//!
//! println!("{} samples in {} chunks", parsed.sample_count(), parsed.chunk_offsets.len());
//! if parsed.used_fallback_stbl {
//!     println!("sample tables were reconstructed, extraction confidence is degraded");
//! }
//! ```
//!
//! ## Working with in-memory buffers
//! ```no_run
//! use mp4chap::{LogForwarder, MuxRequest, TextChapter};
//!
//! let src = std::fs::read("input.m4a").unwrap();
//! let request = MuxRequest::new().with_chapters(vec![TextChapter::new(0, "All of it")]);
//!
//! let out = mp4chap::mux_with(&src, &request, &LogForwarder).unwrap();
//! std::fs::write("output.m4a", out).unwrap();
//! ```
#![warn(missing_docs)]

pub use crate::atom::ident::Fourcc;
pub use crate::atom::stts::SttsItem;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::logging::{LogForwarder, Logger, NopLogger, StderrLogger, Verbosity};
pub use crate::mux::{mux, mux_file, mux_file_with, mux_with, MuxRequest};
pub use crate::parse::{parse_mp4, parse_mp4_file, parse_mp4_file_with, parse_mp4_with, ParsedMp4};
pub use crate::types::{ImageChapter, ImgFmt, MetadataSet, TextChapter};

mod adts;
mod atom;
mod chapter;
mod error;
mod logging;
mod mux;
mod parse;
mod types;
