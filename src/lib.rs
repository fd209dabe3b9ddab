//! Parsing and expansion of image file sequences.
//!
//! A filespec describes a collection of related files differing only by a
//! zero-padded frame number:
//!
//! ```text
//! image.0001.jpg
//! image.0002.jpg
//! ...
//! image.0010.jpg
//!
//! "image.1-10#.jpg"
//! ```
//!
//! Parse a filespec and iterate the filenames:
//!
//! ```
//! use fileseq::FileSequence;
//!
//! let fs = FileSequence::parse("image.1-10#.jpg")?;
//! assert_eq!(fs.size(), 10);
//! assert_eq!(fs.filename(4)?, "image.0004.jpg");
//! assert_eq!(fs.at(0)?, "image.0001.jpg");
//! # Ok::<(), fileseq::Error>(())
//! ```
//!
//! Or go the other way and rebuild compact specs from a pile of names:
//!
//! ```
//! use fileseq::find_sequence;
//!
//! let files = ["a.0001.exr", "a.0002.exr", "a.0003.exr", "notes.txt"];
//! let (seqs, rest) = find_sequence(files)?;
//! assert_eq!(seqs[0].to_string(), "a.1-3#.exr");
//! assert_eq!(rest, ["notes.txt"]);
//! # Ok::<(), fileseq::Error>(())
//! ```

mod error;
mod file_sequence;
mod find;
mod frame_range;
mod frame_set;
mod padding;

pub use error::{Error, Result};
pub use file_sequence::FileSequence;
pub use find::{find_sequence, find_sequence_on_disk};
pub use frame_range::{FrameRange, FrameRangeIter};
pub use frame_set::{FrameSet, FrameSetIter};
pub use padding::Padding;
