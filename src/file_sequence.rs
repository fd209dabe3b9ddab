use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::frame_set::FrameSet;
use crate::padding::Padding;

/// A frame set dressed up as filenames: prefix, frames, pad tokens,
/// suffix.
///
/// ```text
/// foo.1-10#.bar        foo.0001.bar ... foo.0010.bar
/// /baz/foo.1-27x2#.rla
/// foo.1-10.bar         pad width guessed from the numerals
/// ```
///
/// `#` stands for four digits of padding and `@` for one; together they
/// override the width guessed from the frame numerals. No relationship to
/// actual files on disk is presumed.
#[derive(Debug, Clone)]
pub struct FileSequence {
    prefix: String,
    dirname: String,
    basename: String,
    suffix: String,
    frame_set: FrameSet,
}

impl Default for FileSequence {
    fn default() -> Self {
        FileSequence {
            prefix: ".".to_string(),
            dirname: String::new(),
            basename: String::new(),
            suffix: ".".to_string(),
            frame_set: FrameSet::new(),
        }
    }
}

struct RawSequence<'a> {
    dirname: &'a str,
    basename: &'a str,
    frame_set: Option<&'a str>,
    pad: Option<&'a str>,
    suffix: &'a str,
}

fn is_frame_set_byte(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'x' | b'y' | b':' | b',' | b'-')
}

/// Split the text after the basename into frame set, pad tokens and
/// suffix: a maximal run of frame-set characters, a maximal run of `#`/`@`,
/// then either nothing or a dot-initiated extension.
fn split_tail(tail: &str) -> Option<(Option<&str>, Option<&str>, &str)> {
    let set_end = tail
        .bytes()
        .position(|b| !is_frame_set_byte(b))
        .unwrap_or(tail.len());
    let (frame_set, rest) = tail.split_at(set_end);
    let pad_end = rest
        .bytes()
        .position(|b| !matches!(b, b'#' | b'@'))
        .unwrap_or(rest.len());
    let (pad, suffix) = rest.split_at(pad_end);
    if !suffix.is_empty() && !suffix.starts_with('.') {
        return None;
    }
    Some((
        (!frame_set.is_empty()).then_some(frame_set),
        (!pad.is_empty()).then_some(pad),
        suffix,
    ))
}

fn split_sequence(s: &str) -> Option<RawSequence<'_>> {
    // The directory part runs through the last slash; nothing after the
    // basename may contain one, so no other split can succeed.
    let dir_len = s.rfind('/').map_or(0, |i| i + 1);
    let (dirname, rest) = s.split_at(dir_len);

    // Longest basename first. Each candidate ends just before a dot, and
    // the remainder must not be purely digits, so that "foo.0001.1000"
    // keeps "foo" as the basename and ".1000" as the suffix.
    let dots: Vec<usize> = rest
        .bytes()
        .enumerate()
        .filter(|&(_, b)| b == b'.')
        .map(|(i, _)| i)
        .collect();
    for &dot in dots.iter().rev() {
        if dot == 0 {
            continue;
        }
        let after = &rest[dot + 1..];
        if !after.is_empty() && after.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Some((frame_set, pad, suffix)) = split_tail(after) {
            return Some(RawSequence {
                dirname,
                basename: &rest[..dot],
                frame_set,
                pad,
                suffix,
            });
        }
    }

    let (frame_set, pad, suffix) = split_tail(rest)?;
    Some(RawSequence {
        dirname,
        basename: "",
        frame_set,
        pad,
        suffix,
    })
}

impl FileSequence {
    /// Parse a filespec such as `foo.1-10#.bar` or `/baz/foo.1-10.bar`.
    ///
    /// A parse succeeds only if a frame set or pad tokens are present. Pad
    /// tokens override the guessed padding, except that a lone `@` (width
    /// one) carries no information and is ignored.
    pub fn parse(s: &str) -> Result<FileSequence> {
        let raw = split_sequence(s).ok_or_else(|| Error::parse("file sequence", s))?;

        let frame_set = match raw.frame_set {
            Some(text) => FrameSet::parse(text)?,
            None => FrameSet::new(),
        };

        let prefix = if raw.basename.is_empty() {
            raw.dirname.to_string()
        } else {
            format!("{}{}.", raw.dirname, raw.basename)
        };

        let mut sequence = FileSequence {
            prefix,
            dirname: raw.dirname.to_string(),
            basename: raw.basename.to_string(),
            suffix: raw.suffix.to_string(),
            frame_set,
        };

        match raw.pad {
            Some(pad) => {
                let width: u32 = pad.bytes().map(|b| if b == b'#' { 4 } else { 1 }).sum();
                if width > 1 {
                    sequence.frame_set.set_padding(Padding::explicit(width));
                }
            }
            None => {
                if raw.frame_set.is_none() {
                    return Err(Error::parse("file sequence", s));
                }
            }
        }

        Ok(sequence)
    }

    /// True if `s` parses as a file sequence. The designated non-failing
    /// probe; parse and probe never disagree.
    pub fn is_sequence(s: &str) -> bool {
        FileSequence::parse(s).is_ok()
    }

    /// Assemble a sequence from its components; dirname and basename are
    /// derived from the prefix.
    pub fn from_parts(prefix: &str, frame_set: FrameSet, suffix: &str) -> FileSequence {
        let dir_len = prefix.rfind('/').map_or(0, |i| i + 1);
        let (dirname, rest) = prefix.split_at(dir_len);
        let basename = rest.strip_suffix('.').unwrap_or(rest);
        FileSequence {
            prefix: prefix.to_string(),
            dirname: dirname.to_string(),
            basename: basename.to_string(),
            suffix: suffix.to_string(),
            frame_set,
        }
    }

    /// Prefix up to and including the period, e.g. `/baz/foo.` for
    /// `/baz/foo.1#.bar`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Directory component of the prefix, `/baz/` for `/baz/foo.1#.bar`.
    pub fn dirname(&self) -> &str {
        &self.dirname
    }

    /// Base filename without directory or extension, `foo` for
    /// `/baz/foo.1#.bar`.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Extension including the leading period, `.bar` for
    /// `/baz/foo.1#.bar`.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn frame_set(&self) -> &FrameSet {
        &self.frame_set
    }

    pub fn frame_set_mut(&mut self) -> &mut FrameSet {
        &mut self.frame_set
    }

    pub fn padding(&self) -> Padding {
        self.frame_set.padding()
    }

    /// Formatting width of the sequence: the explicit padding width, or 1
    /// when the padding is only a guess.
    pub fn pad_size(&self) -> u32 {
        self.frame_set.padding().as_explicit_width()
    }

    pub fn size(&self) -> usize {
        self.frame_set.size()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_set.is_empty()
    }

    pub fn contains(&self, frame: i32) -> bool {
        self.frame_set.contains(frame)
    }

    pub fn index_of(&self, frame: i32) -> Option<usize> {
        self.frame_set.index_of(frame)
    }

    pub fn nearest(&self, frame: i32) -> (Option<i32>, Option<i32>) {
        self.frame_set.nearest(frame)
    }

    pub fn normalize(&mut self) {
        self.frame_set.normalize();
    }

    /// Filename for a frame number. Fails if the sequence has frames and
    /// `frame` is not one of them; a sequence with no frame set at all
    /// (`foo.#.bar`) formats any frame.
    pub fn filename(&self, frame: i32) -> Result<String> {
        if !self.frame_set.ranges().is_empty() && !self.frame_set.contains(frame) {
            return Err(Error::frame_out_of_range(frame));
        }
        Ok(self.format_filename(frame))
    }

    /// Filename at an index; negative indices count back from the end.
    pub fn at(&self, index: isize) -> Result<String> {
        let frame = self
            .frame_set
            .get(index)
            .ok_or_else(|| Error::index_out_of_range(index as i64))?;
        Ok(self.format_filename(frame))
    }

    /// Iterate the materialized filenames in frame-set order.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.frame_set.iter().map(|frame| self.format_filename(frame))
    }

    fn format_filename(&self, frame: i32) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            self.frame_set.padding().format(frame),
            self.suffix
        )
    }

    pub fn can_merge(&self, other: &FileSequence) -> bool {
        self.suffix == other.suffix
            && self.prefix == other.prefix
            && self.frame_set.can_merge(&other.frame_set)
    }

    /// Fold another sequence's frames into this one. The prefixes and
    /// suffixes must match; the result is normalized unless the in-order
    /// fast path applied.
    pub fn merge(&mut self, other: &FileSequence) -> Result<()> {
        if self.suffix != other.suffix || self.prefix != other.prefix {
            return Err(self.merge_mismatch(other));
        }
        self.frame_set.merge(&other.frame_set)
    }

    /// Batch merge; normalization runs at most once at the end. Any
    /// mismatch in the batch, of names or of padding, fails the call
    /// with the sequence unmodified.
    pub fn merge_multiple(&mut self, others: &[FileSequence]) -> Result<()> {
        if others.is_empty() {
            return Ok(());
        }
        let mut frame_sets = Vec::with_capacity(others.len());
        for other in others {
            if self.suffix != other.suffix || self.prefix != other.prefix {
                return Err(self.merge_mismatch(other));
            }
            frame_sets.push(other.frame_set.clone());
        }
        self.frame_set.merge_multiple(&frame_sets)
    }

    fn merge_mismatch(&self, other: &FileSequence) -> Error {
        Error::MergeMismatch {
            left: self.to_string(),
            right: other.to_string(),
        }
    }

    /// Re-parse this sequence from a new filespec. On error the sequence
    /// is left as it was.
    pub fn set_sequence(&mut self, s: &str) -> Result<()> {
        *self = FileSequence::parse(s)?;
        Ok(())
    }

    /// Replace the prefix; it must end with a dot. Dirname and basename
    /// are re-derived.
    pub fn set_prefix(&mut self, prefix: &str) -> Result<()> {
        let rest = prefix
            .strip_suffix('.')
            .ok_or(Error::InvalidField("prefix must end with a dot"))?;
        let dir_len = rest.rfind('/').map_or(0, |i| i + 1);
        let (dirname, basename) = rest.split_at(dir_len);
        if basename.is_empty() {
            return Err(Error::InvalidField("prefix must contain a basename"));
        }
        self.dirname = dirname.to_string();
        self.basename = basename.to_string();
        self.prefix = prefix.to_string();
        Ok(())
    }

    /// Replace the directory component; it must be empty or end with a
    /// slash. The prefix is rebuilt.
    pub fn set_dirname(&mut self, dirname: &str) -> Result<()> {
        if !dirname.is_empty() && !dirname.ends_with('/') {
            return Err(Error::InvalidField(
                "dirname must end with a slash or be empty",
            ));
        }
        self.dirname = dirname.to_string();
        self.rebuild_prefix();
        Ok(())
    }

    /// Replace the basename; it may not be empty or contain a slash. The
    /// prefix is rebuilt.
    pub fn set_basename(&mut self, basename: &str) -> Result<()> {
        if basename.is_empty() {
            return Err(Error::InvalidField("basename may not be empty"));
        }
        if basename.contains('/') {
            return Err(Error::InvalidField("basename may not contain slashes"));
        }
        self.basename = basename.to_string();
        self.rebuild_prefix();
        Ok(())
    }

    /// Replace the suffix; it must be empty or begin with a dot.
    pub fn set_suffix(&mut self, suffix: &str) -> Result<()> {
        if !suffix.is_empty() && !suffix.starts_with('.') {
            return Err(Error::InvalidField(
                "suffix must begin with a dot or be empty",
            ));
        }
        self.suffix = suffix.to_string();
        Ok(())
    }

    fn rebuild_prefix(&mut self) {
        self.prefix = if self.basename.is_empty() {
            self.dirname.clone()
        } else {
            format!("{}{}.", self.dirname, self.basename)
        };
    }
}

impl PartialEq for FileSequence {
    fn eq(&self, other: &Self) -> bool {
        // cheapest comparison first
        self.suffix == other.suffix
            && self.prefix == other.prefix
            && self.frame_set == other.frame_set
    }
}

impl fmt::Display for FileSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.frame_set)?;
        let padding = self.frame_set.padding();
        if padding.is_explicit() {
            let width = padding.digits();
            for _ in 0..width / 4 {
                write!(f, "#")?;
            }
            for _ in 0..width % 4 {
                write!(f, "@")?;
            }
        }
        write!(f, "{}", self.suffix)
    }
}

impl FromStr for FileSequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<FileSequence> {
        FileSequence::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_various_filespecs() {
        // (spec, prefix, dirname, basename, suffix, pad, frame set)
        let table: &[(&str, &str, &str, &str, &str, u32, Option<&str>)] = &[
            ("foo.1-1#.bar", "foo.", "", "foo", ".bar", 4, Some("1-1")),
            ("foo.1-1:2#.bar", "foo.", "", "foo", ".bar", 4, Some("1-1:2")),
            ("foo.#.bar", "foo.", "", "foo", ".bar", 4, None),
            ("foo.1-15x2#@#@.bar", "foo.", "", "foo", ".bar", 10, Some("1-15x2")),
            ("foo.1-15y2#@#@.bar", "foo.", "", "foo", ".bar", 10, Some("1-15y2")),
            ("foo.1-15x2.bar", "foo.", "", "foo", ".bar", 1, Some("1-15x2")),
            ("someImage.1,3,5#.rla", "someImage.", "", "someImage", ".rla", 4, Some("1,3,5")),
            ("foo.#.exr.tx", "foo.", "", "foo", ".exr.tx", 4, None),
            ("foo.1-10#.bar.1-9#.bar", "foo.1-10#.bar.", "", "foo.1-10#.bar", ".bar", 4, Some("1-9")),
            ("foo.1-9.bar", "foo.", "", "foo", ".bar", 1, Some("1-9")),
            ("foo.9.bar", "foo.", "", "foo", ".bar", 1, Some("9-9")),
            ("foo.1-10#.bar", "foo.", "", "foo", ".bar", 4, Some("1-10")),
            ("foo.1-10:10#.bar", "foo.", "", "foo", ".bar", 4, Some("1-10:10")),
            ("/foo.1-10#.bar", "/foo.", "/", "foo", ".bar", 4, Some("1-10")),
            ("baz/foo.1-10#.bar", "baz/foo.", "baz/", "foo", ".bar", 4, Some("1-10")),
            ("/baz/foo.1-10#.bar", "/baz/foo.", "/baz/", "foo", ".bar", 4, Some("1-10")),
            ("/bar/baz/foo.1-10#.bar", "/bar/baz/foo.", "/bar/baz/", "foo", ".bar", 4, Some("1-10")),
            ("foo.-15-15#.bar", "foo.", "", "foo", ".bar", 4, Some("-15-15")),
            ("foo.-15--1#.bar", "foo.", "", "foo", ".bar", 4, Some("-15--1")),
            ("foo.1-1000#", "foo.", "", "foo", "", 4, Some("1-1000")),
            ("1-1000#.bar", "", "", "", ".bar", 4, Some("1-1000")),
            ("1-1000#", "", "", "", "", 4, Some("1-1000")),
            ("foo/1-1000#", "foo/", "foo/", "", "", 4, Some("1-1000")),
            ("1", "", "", "", "", 1, Some("1")),
            // would change if fractional frame numbers ever existed
            ("chanData.0190.5000", "chanData.", "", "chanData", ".5000", 4, Some("190")),
            // y0 collapses to a plain step of one
            ("foo.1-10y0.bar", "foo.", "", "foo", ".bar", 1, Some("1-10")),
        ];

        for &(spec, prefix, dirname, basename, suffix, pad, frame_set) in table {
            let fs = FileSequence::parse(spec).unwrap();
            assert_eq!(fs.prefix(), prefix, "{spec}");
            assert_eq!(fs.dirname(), dirname, "{spec}");
            assert_eq!(fs.basename(), basename, "{spec}");
            assert_eq!(fs.suffix(), suffix, "{spec}");
            assert_eq!(fs.pad_size(), pad, "{spec}");
            if let Some(expected) = frame_set {
                assert_eq!(fs.frame_set(), &FrameSet::parse(expected).unwrap(), "{spec}");
            } else {
                assert!(fs.frame_set().ranges().is_empty(), "{spec}");
            }
        }
    }

    #[test]
    fn guesses_pad_size_without_tokens() {
        for (spec, pad) in [
            ("foo.0009.bar", 4),
            ("foo.1-9x0002.bar", 1),
            ("foo.9-1x-0002.bar", 1),
            ("foo.9-09x0002.bar", 2),
            ("foo.9,10.bar", 1),
            ("foo.009,10.bar", 3),
            ("foo.-011.bar", 4),
            ("foo.0.bar", 1),
            ("foo.1-100:10.bar", 1),
            // padded to 4 even though the range runs past 9999
            ("foo.0001-10000.bar", 4),
        ] {
            assert_eq!(FileSequence::parse(spec).unwrap().pad_size(), pad, "{spec}");
        }
    }

    #[test]
    fn rejects_invalid_filespecs() {
        for spec in [
            "",
            "asdasdasda",
            "foo.fred#.bar",
            "foo..bar",
            "foo.-,x#.bar",
            "foo.x2.bar",
            "foo.-20---10.bar",
            // order reversed
            "foo.10-1.bar",
            "foo.-10--20.bar",
            // a dot demands a prefix or suffix around it
            ".1",
            "1.",
            // mismatched padding
            "foo.010,0020.bar",
            "foo.010-0020.bar",
            // step and interleave cannot combine
            "foo.1-100x2:10#.bar",
            "foo.1-100:10x2#.bar",
            "foo.1:10#.bar",
            // pad tokens buried in a directory name
            "/net/vol240/shots/spi/home/lib/katana/katana.2.0@.75/rhel40m64/PYTHON_LIBS/NodegraphAPI/NodegraphAPI_cmodule.so",
            // frame numbers that overflow 32 bits
            "569201265582281.jpg",
            "-569201265582281.jpg",
            "1-569201265582281.jpg",
            "-569201265582281--1.jpg",
            "1x569201265582281.jpg",
            "1:569201265582281.jpg",
        ] {
            assert!(FileSequence::parse(spec).is_err(), "{spec:?} parsed");
            assert!(!FileSequence::is_sequence(spec), "{spec:?} probed true");
        }
    }

    #[test]
    fn stringifies_canonically() {
        for (spec, expected) in [
            ("foo.1-10#.bar", "foo.1-10#.bar"),
            ("foo.#.bar", "foo.#.bar"),
            ("foo.#", "foo.#"),
            ("bar/foo.#", "bar/foo.#"),
            ("#.bar", "#.bar"),
            ("#", "#"),
            ("foo.1-10x1#.bar", "foo.1-10#.bar"),
            ("foo.1-10x1,2-2x0,3-3#.bar", "foo.1-10,3#.bar"),
            ("foo.1-10.bar", "foo.1-10.bar"),
            ("foo.1-10y3.bar", "foo.1-10y3.bar"),
            ("foo.1-10:5.bar", "foo.1-10:5.bar"),
            ("foo.1-10x2#@#@.bar", "foo.1-10x2##@@.bar"),
        ] {
            assert_eq!(FileSequence::parse(spec).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn round_trips_are_stable() {
        for spec in [
            "foo.1-10#.bar",
            "foo.1-10.bar",
            "foo.1-10y3.bar",
            "foo.1-10:5.bar",
            "/a/b/foo.1,3,5#.rla",
            "foo.-15--1#.bar",
            "foo.1-10x2#@#@.bar",
            "foo.#.bar",
        ] {
            let parsed = FileSequence::parse(spec).unwrap();
            let canonical = parsed.to_string();
            let reparsed = FileSequence::parse(&canonical).unwrap();
            assert_eq!(reparsed, parsed, "{spec}");
            assert_eq!(reparsed.to_string(), canonical, "{spec}");
        }
    }

    #[test]
    fn materializes_filenames() {
        assert_eq!(FileSequence::parse("foo.011.bar").unwrap().at(0).unwrap(), "foo.011.bar");
        assert_eq!(FileSequence::parse("foo.-011.bar").unwrap().at(0).unwrap(), "foo.-011.bar");

        let fs = FileSequence::parse("foo.1-5#.bar").unwrap();
        let names: Vec<String> = fs.iter().collect();
        assert_eq!(
            names,
            vec![
                "foo.0001.bar",
                "foo.0002.bar",
                "foo.0003.bar",
                "foo.0004.bar",
                "foo.0005.bar"
            ]
        );

        assert_eq!(fs.filename(4).unwrap(), "foo.0004.bar");
        assert!(fs.filename(6).is_err());
        assert!(fs.at(5).is_err());
        assert_eq!(fs.at(-1).unwrap(), "foo.0005.bar");

        // no frame set at all: any frame formats
        let bare = FileSequence::parse("foo.#.bar").unwrap();
        assert_eq!(bare.filename(7).unwrap(), "foo.0007.bar");
    }

    #[test]
    fn contains_passes_through() {
        let fs = FileSequence::parse("foo.1-10#.bar").unwrap();
        assert!(fs.contains(1));
        assert!(!fs.contains(0));
    }

    #[test]
    fn nearest_passes_through() {
        let fs = FileSequence::parse("foo.1-10x3.bar").unwrap();
        assert_eq!(fs.nearest(0), (None, Some(1)));
        assert_eq!(fs.nearest(1), (None, Some(4)));
        assert_eq!(fs.nearest(2), (Some(1), Some(4)));
    }

    #[test]
    fn compares_prefix_suffix_and_frames() {
        let eq = |a: &str, b: &str, expected: bool| {
            let fs1 = FileSequence::parse(a).unwrap();
            let fs2 = FileSequence::parse(b).unwrap();
            assert_eq!(fs1 == fs2, expected, "{a} == {b}");
        };
        eq("foo.1-10#.bar", "foo.1-10#.bar", true);
        eq("foo.1-10#.bar", "foo.1-10#.baz", false);
        eq("foo.1-10@#.bar", "foo.1-10#@.bar", true);
        eq("foo.1-10#.bar", "foo.1-10#@.bar", false);
        eq("foo.1-10#.bar", "baz.1-10#.bar", false);
        eq("foo.1-10#.bar", "baz.2-10#.bar", false);
    }

    #[test]
    fn builds_from_parts() {
        let frame_set = FrameSet::parse_with_padding("1-10", 4).unwrap();
        let fs = FileSequence::from_parts("baz/foo.", frame_set, ".bar");
        assert_eq!(fs, FileSequence::parse("baz/foo.1-10#.bar").unwrap());
        assert_eq!(fs.dirname(), "baz/");
        assert_eq!(fs.basename(), "foo");
    }

    #[test]
    fn setters_enforce_structure() {
        let frame_set = FrameSet::parse_with_padding("1-10", 4).unwrap();
        let mut fs = FileSequence::from_parts("baz/foo.", frame_set, ".bar");

        assert!(fs.set_suffix("suffix").is_err());
        fs.set_suffix("").unwrap();
        assert_eq!(fs.suffix(), "");

        assert!(fs.set_prefix("baz/foo").is_err());
        assert!(fs.set_basename("baz/foo").is_err());
        assert!(fs.set_basename("").is_err());

        fs.set_basename("basename").unwrap();
        assert_eq!(fs.prefix(), "baz/basename.");

        fs.set_dirname("dirname/").unwrap();
        assert_eq!(fs.prefix(), "dirname/basename.");
        assert!(fs.set_dirname("nodash").is_err());

        fs.set_prefix("other/name.").unwrap();
        assert_eq!(fs.dirname(), "other/");
        assert_eq!(fs.basename(), "name");
    }

    #[test]
    fn set_sequence_matches_parse() {
        let mut fs1 = FileSequence::default();
        fs1.set_sequence("basename.1#.bar").unwrap();
        let fs2 = FileSequence::parse("basename.1#.bar").unwrap();
        assert_eq!(fs1.basename(), fs2.basename());
        assert_eq!(fs1, fs2);

        // a failed re-parse leaves the sequence alone
        assert!(fs1.set_sequence("not a sequence at all").is_err());
        assert_eq!(fs1, fs2);
    }

    #[test]
    fn merges_compatible_sequences() {
        let merge = |a: &str, b: &str| -> Result<String> {
            let mut fs = FileSequence::parse(a).unwrap();
            fs.merge(&FileSequence::parse(b).unwrap())?;
            Ok(fs.to_string())
        };

        assert_eq!(merge("foo.1#.jpg", "foo.2#.jpg").unwrap(), "foo.1-2#.jpg");
        // an empty receiver stays empty
        assert_eq!(merge("foo.#.jpg", "foo.1#.jpg").unwrap(), "foo.#.jpg");
        // an empty argument is a no-op
        assert_eq!(merge("foo.1#.jpg", "foo.#.jpg").unwrap(), "foo.1#.jpg");

        // explicit and implicit widths of four agree
        assert_eq!(merge("foo.0001.jpg", "foo.1000.jpg").unwrap(), "foo.1,1000#.jpg");
        assert_eq!(merge("foo.1000.jpg", "foo.0001.jpg").unwrap(), "foo.1,1000#.jpg");
        assert_eq!(merge("foo.0001.jpg", "foo.10000.jpg").unwrap(), "foo.1,10000#.jpg");
        assert_eq!(merge("foo.10000.jpg", "foo.0001.jpg").unwrap(), "foo.1,10000#.jpg");

        // incompatible explicit widths refuse
        assert!(matches!(
            merge("foo.01.jpg", "foo.001.jpg"),
            Err(Error::PaddingMismatch)
        ));
        // differing names refuse
        assert!(matches!(
            merge("foo.1#.jpg", "bar.2#.jpg"),
            Err(Error::MergeMismatch { .. })
        ));
    }

    #[test]
    fn merge_multiple_failure_leaves_the_receiver_alone() {
        let mut fs = FileSequence::parse("foo.0001.jpg").unwrap();

        // padding mismatch in the middle of the batch
        let others = vec![
            FileSequence::parse("foo.0002.jpg").unwrap(),
            FileSequence::parse("foo.001.jpg").unwrap(),
            FileSequence::parse("foo.0003.jpg").unwrap(),
        ];
        assert!(matches!(
            fs.merge_multiple(&others),
            Err(Error::PaddingMismatch)
        ));
        assert_eq!(fs.to_string(), "foo.1#.jpg");

        // prefix mismatch in the middle of the batch
        let others = vec![
            FileSequence::parse("foo.0002.jpg").unwrap(),
            FileSequence::parse("bar.0003.jpg").unwrap(),
        ];
        assert!(matches!(
            fs.merge_multiple(&others),
            Err(Error::MergeMismatch { .. })
        ));
        assert_eq!(fs.to_string(), "foo.1#.jpg");

        // the clean batch still goes through
        let others = vec![
            FileSequence::parse("foo.0002.jpg").unwrap(),
            FileSequence::parse("foo.0003.jpg").unwrap(),
        ];
        fs.merge_multiple(&others).unwrap();
        assert_eq!(fs.to_string(), "foo.1-3#.jpg");
    }

    #[test]
    fn default_sequence_round_trips() {
        let fs = FileSequence::default();
        assert_eq!(fs.prefix(), ".");
        assert_eq!(fs.suffix(), ".");
        assert_eq!(fs.size(), 0);
    }
}
