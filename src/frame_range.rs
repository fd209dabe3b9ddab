use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::frame_set::FrameSet;
use crate::padding::Padding;

/// One arithmetic progression of frames.
///
/// The textual form is `in[-out][x step | y step | :interleave]`:
///
/// ```text
/// 1          a single frame
/// 1-10       frames 1 through 10
/// 1-10x3     every third frame: 1, 4, 7, 10
/// 10-1x-2    stepping backward: 10, 8, 6, 4, 2
/// 1-10y3     inverted step, the frames x3 would skip: 2, 3, 5, 6, 8, 9
/// 1-10:5     interleaved playback order: 1, 6, 3, 5, 7, 9, 2, 4, 8, 10
/// ```
///
/// An inverted step of zero means "skip nothing" and collapses to a plain
/// step of one; an interleave of one likewise collapses to no interleave.
#[derive(Debug, Clone, Copy)]
pub struct FrameRange {
    in_time: i32,
    out_time: i32,
    step: i32,
    invert_step: bool,
    interleave: i32,
    padding: Padding,
}

impl Default for FrameRange {
    /// The empty range: zero frames, step zero, invalid padding.
    fn default() -> Self {
        FrameRange {
            in_time: 0,
            out_time: 0,
            step: 0,
            invert_step: false,
            interleave: 0,
            padding: Padding::INVALID,
        }
    }
}

enum RawStep<'a> {
    None,
    Step(&'a str),
    InvertStep(&'a str),
    Interleave(&'a str),
}

struct RawRange<'a> {
    in_str: &'a str,
    out_str: Option<&'a str>,
    step: RawStep<'a>,
}

/// Take an optionally signed run of digits off the front of `s`.
fn scan_number(s: &str) -> Option<(&str, &str)> {
    let body = s.strip_prefix('-').unwrap_or(s);
    let digits = body.len() - body.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    Some(s.split_at(s.len() - body.len() + digits))
}

fn scan_full_number(s: &str) -> Option<&str> {
    match scan_number(s) {
        Some((number, "")) => Some(number),
        _ => None,
    }
}

fn split_range(s: &str) -> Option<RawRange<'_>> {
    let (in_str, rest) = scan_number(s)?;
    if rest.is_empty() {
        return Some(RawRange {
            in_str,
            out_str: None,
            step: RawStep::None,
        });
    }

    let rest = rest.strip_prefix('-')?;
    let (out_str, rest) = scan_number(rest)?;
    let step = if rest.is_empty() {
        RawStep::None
    } else if let Some(tail) = rest.strip_prefix('x') {
        RawStep::Step(scan_full_number(tail)?)
    } else if let Some(tail) = rest.strip_prefix('y') {
        RawStep::InvertStep(scan_full_number(tail)?)
    } else if let Some(tail) = rest.strip_prefix(':') {
        if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        RawStep::Interleave(tail)
    } else {
        return None;
    };

    Some(RawRange {
        in_str,
        out_str: Some(out_str),
        step,
    })
}

fn parse_frame_number(s: &str) -> Result<i32> {
    s.parse::<i32>().map_err(|_| Error::InvalidRange {
        reason: "frame number does not fit in 32 bits",
    })
}

fn guessed_digits(frame: i32) -> u32 {
    let mut digits = 1;
    let mut rest = frame.unsigned_abs() / 10;
    while rest > 0 {
        digits += 1;
        rest /= 10;
    }
    digits
}

impl FrameRange {
    /// Parse a frame range spec such as `1-10x2`.
    ///
    /// Padding is derived jointly from the in and out numerals; mismatched
    /// explicit paddings (`010-0020`) fail.
    pub fn parse(s: &str) -> Result<FrameRange> {
        let raw = split_range(s).ok_or_else(|| Error::parse("frame range", s))?;

        let in_time = parse_frame_number(raw.in_str)?;
        let mut padding = Padding::parse(raw.in_str)?;
        let out_time = match raw.out_str {
            Some(out_str) => {
                padding = padding.combine(Padding::parse(out_str)?);
                if !padding.is_valid() {
                    return Err(Error::PaddingMismatch);
                }
                parse_frame_number(out_str)?
            }
            None => in_time,
        };

        let (step, invert_step, interleave) = match raw.step {
            RawStep::None => (1, false, 0),
            RawStep::Step(text) => (parse_frame_number(text)?, false, 0),
            RawStep::InvertStep(text) => {
                let step = parse_frame_number(text)?;
                if step == 0 {
                    // skipping no frames keeps all frames
                    (1, false, 0)
                } else {
                    (step, true, 0)
                }
            }
            RawStep::Interleave(text) => {
                let interleave = parse_frame_number(text)?;
                (1, false, if interleave == 1 { 0 } else { interleave })
            }
        };

        let range = FrameRange {
            in_time,
            out_time,
            step,
            invert_step,
            interleave,
            padding,
        };
        range.validate()?;
        Ok(range)
    }

    /// True if `s` parses as a frame range.
    pub fn is_sequence(s: &str) -> bool {
        FrameRange::parse(s).is_ok()
    }

    /// Construct a range with implicit padding guessed from the frame
    /// values (sign not counted).
    pub fn new(in_time: i32, out_time: i32, step: i32, invert_step: bool) -> Result<FrameRange> {
        let digits = guessed_digits(in_time).max(guessed_digits(out_time));
        FrameRange::with_padding(in_time, out_time, step, invert_step, Padding::implicit(digits))
    }

    pub fn with_padding(
        in_time: i32,
        out_time: i32,
        step: i32,
        invert_step: bool,
        padding: Padding,
    ) -> Result<FrameRange> {
        let range = FrameRange {
            in_time,
            out_time,
            step,
            invert_step,
            interleave: 0,
            padding,
        };
        range.validate()?;
        Ok(range)
    }

    /// An interleaved range always steps by one.
    pub fn with_interleave(
        in_time: i32,
        out_time: i32,
        interleave: i32,
        padding: Padding,
    ) -> Result<FrameRange> {
        let range = FrameRange {
            in_time,
            out_time,
            step: 1,
            invert_step: false,
            interleave: if interleave == 1 { 0 } else { interleave },
            padding,
        };
        range.validate()?;
        Ok(range)
    }

    pub(crate) fn single(frame: i32, padding: Padding) -> FrameRange {
        FrameRange {
            in_time: frame,
            out_time: frame,
            step: 1,
            invert_step: false,
            interleave: 0,
            padding,
        }
    }

    pub(crate) fn run(in_time: i32, out_time: i32, step: i32, padding: Padding) -> FrameRange {
        FrameRange {
            in_time,
            out_time,
            step,
            invert_step: false,
            interleave: 0,
            padding,
        }
    }

    fn validate(&self) -> Result<()> {
        let reason = if self.step > 0 && self.in_time > self.out_time {
            "in time is after out time"
        } else if self.step < 0 && self.in_time < self.out_time {
            "out time is after in time with a negative step"
        } else if self.step == 0 && self.in_time != self.out_time {
            "step of zero requires a single frame"
        } else if self.step == 0 && self.invert_step {
            "step of zero cannot be inverted"
        } else if self.interleave < 0 {
            "interleave must not be negative"
        } else if self.step != 1 && self.interleave != 0 {
            "step and interleave cannot combine"
        } else {
            return Ok(());
        };
        Err(Error::InvalidRange { reason })
    }

    pub fn in_time(&self) -> i32 {
        self.in_time
    }

    pub fn out_time(&self) -> i32 {
        self.out_time
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn invert_step(&self) -> bool {
        self.invert_step
    }

    pub fn interleave(&self) -> i32 {
        self.interleave
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub(crate) fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
    }

    /// Grow the range by one step; the caller guarantees the new out time
    /// fits in 32 bits.
    pub(crate) fn extend_by_step(&mut self) {
        self.out_time += self.step;
    }

    /// Number of frames in the range.
    pub fn size(&self) -> usize {
        let span_fwd = self.out_time as i64 - self.in_time as i64;
        let span_rev = -span_fwd;
        if self.step > 0 {
            let step = self.step as i64;
            if self.invert_step {
                if step == 1 {
                    // skipping every frame leaves nothing
                    return 0;
                }
                ((span_fwd + 1) - (span_fwd / step + 1)) as usize
            } else {
                (span_fwd / step + 1) as usize
            }
        } else if self.step < 0 {
            let step = -(self.step as i64);
            if self.invert_step {
                if step == 1 {
                    return 0;
                }
                ((span_rev + 1) - (span_rev / step + 1)) as usize
            } else {
                (span_rev / step + 1) as usize
            }
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Frame at `index` in enumeration order, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<i32> {
        let idx = index as i64;
        let frame = if self.invert_step {
            if self.step == 1 || self.step == -1 {
                return None;
            }
            if self.step > 0 {
                // in + index, skipping ahead once per (step - 1) frames kept
                self.in_time as i64 + 1 + idx + idx / (self.step as i64 - 1)
            } else {
                self.in_time as i64 - 1 - idx - idx / (-(self.step as i64) - 1)
            }
        } else {
            self.in_time as i64 + idx * self.step as i64
        };

        if self.step > 0 {
            if frame > self.out_time as i64 {
                return None;
            }
        } else if self.step < 0 {
            if frame < self.out_time as i64 {
                return None;
            }
        } else {
            return None;
        }

        if self.interleave > 1 {
            return self.interleave_frame_at(index);
        }
        Some(frame as i32)
    }

    /// Membership test without computing an index.
    pub fn contains(&self, frame: i32) -> bool {
        if self.interleave > 1 {
            return frame >= self.in_time && frame <= self.out_time;
        }
        if self.step > 0 {
            if frame < self.in_time || frame > self.out_time {
                return false;
            }
            let on_step = (frame as i64 - self.in_time as i64) % self.step as i64 == 0;
            on_step != self.invert_step
        } else if self.step < 0 {
            if frame > self.in_time || frame < self.out_time {
                return false;
            }
            let on_step = (self.in_time as i64 - frame as i64) % -(self.step as i64) == 0;
            on_step != self.invert_step
        } else {
            false
        }
    }

    /// Index of `frame` in enumeration order, or `None` if absent.
    pub fn index_of(&self, frame: i32) -> Option<usize> {
        if self.interleave > 1 {
            if frame < self.in_time || frame > self.out_time {
                return None;
            }
            return self.interleave_index_of(frame);
        }
        if !self.contains(frame) {
            return None;
        }
        let (offset, step) = if self.step > 0 {
            (frame as i64 - self.in_time as i64, self.step as i64)
        } else {
            (self.in_time as i64 - frame as i64, -(self.step as i64))
        };
        if self.invert_step {
            // subtract the skipped frames transited on the way here
            Some(((offset - 1) - (offset - 1) / step) as usize)
        } else {
            Some((offset / step) as usize)
        }
    }

    /// Nearest member frames strictly left and right of `frame`.
    pub fn nearest(&self, frame: i32) -> (Option<i32>, Option<i32>) {
        if self.is_empty() {
            return (None, None);
        }

        if self.invert_step {
            // An inverted range never misses two frames in a row, so the
            // neighbors are reachable with a couple of membership probes.
            let (low, high) = if self.step > 0 {
                let high = if self.contains(self.out_time) {
                    self.out_time
                } else {
                    self.out_time - 1
                };
                (self.in_time + 1, high)
            } else {
                let low = if self.contains(self.out_time) {
                    self.out_time
                } else {
                    self.out_time + 1
                };
                (low, self.in_time - 1)
            };

            if frame < low {
                return (None, Some(low));
            }
            if frame > high {
                return (Some(high), None);
            }

            let probe = |candidate: i64| -> bool {
                i32::try_from(candidate).is_ok_and(|c| self.contains(c))
            };
            let f = frame as i64;
            let left = if probe(f - 1) {
                Some(frame - 1)
            } else if f - 2 >= low as i64 {
                Some((f - 2) as i32)
            } else {
                None
            };
            let right = if probe(f + 1) {
                Some(frame + 1)
            } else if f + 2 <= high as i64 {
                Some((f + 2) as i32)
            } else {
                None
            };
            return (left, right);
        }

        let low = self.in_time.min(self.out_time);
        let high = self.in_time.max(self.out_time);
        let step = (self.step as i64).abs();
        if frame < low {
            return (None, Some(low));
        }
        if frame > high {
            return (Some(high), None);
        }

        let mut lo_near = frame as i64 - (frame as i64 - low as i64) % step;
        let hi_near = lo_near + step;
        if lo_near == frame as i64 {
            lo_near -= step;
        }
        let left = (lo_near >= low as i64).then_some(lo_near as i32);
        let right = (hi_near <= high as i64).then_some(hi_near as i32);
        (left, right)
    }

    /// Explode an inverted range into a set of singletons in enumeration
    /// order. Fails on a range that is not inverted.
    pub fn uninvert(&self) -> Result<FrameSet> {
        if !self.invert_step {
            return Err(Error::InvalidRange {
                reason: "range has no inverted step",
            });
        }

        let mut set = FrameSet::new();
        for frame in self.iter() {
            set.append(FrameRange::single(frame, self.padding))?;
        }
        // Not normalized: normalize would reorder a reverse range.
        Ok(set)
    }

    /// Iterate the frames of the range; emits exactly `size()` values.
    pub fn iter(&self) -> FrameRangeIter {
        FrameRangeIter {
            range: *self,
            index: 0,
            len: self.size(),
        }
    }

    fn interleave_frame_at(&self, index: usize) -> Option<i32> {
        let mut used = HashSet::new();
        let mut stride = self.interleave as i64;
        let mut next_index = 0usize;
        loop {
            let mut frame = self.in_time as i64;
            while frame <= self.out_time as i64 {
                if used.insert(frame) {
                    if next_index == index {
                        return Some(frame as i32);
                    }
                    next_index += 1;
                }
                frame += stride;
            }
            if stride == 1 {
                return None;
            }
            stride /= 2;
        }
    }

    fn interleave_index_of(&self, frame: i32) -> Option<usize> {
        let mut used = HashSet::new();
        let mut stride = self.interleave as i64;
        let mut index = 0usize;
        loop {
            let mut candidate = self.in_time as i64;
            while candidate <= self.out_time as i64 {
                if used.insert(candidate) {
                    if candidate == frame as i64 {
                        return Some(index);
                    }
                    index += 1;
                }
                candidate += stride;
            }
            if stride == 1 {
                return None;
            }
            stride /= 2;
        }
    }
}

impl PartialEq for FrameRange {
    /// Equal fields with *compatible* (not identical) padding.
    fn eq(&self, other: &Self) -> bool {
        self.in_time == other.in_time
            && self.out_time == other.out_time
            && self.step == other.step
            && self.invert_step == other.invert_step
            && self.interleave == other.interleave
            && self.padding.combine(other.padding).is_valid()
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.in_time)?;
        if self.out_time != self.in_time {
            write!(f, "-{}", self.out_time)?;
        }
        if self.step != 1 {
            write!(f, "{}{}", if self.invert_step { 'y' } else { 'x' }, self.step)?;
        } else if self.interleave > 0 {
            write!(f, ":{}", self.interleave)?;
        }
        Ok(())
    }
}

impl FromStr for FrameRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<FrameRange> {
        FrameRange::parse(s)
    }
}

/// Bounded iterator over the frames of a [`FrameRange`].
#[derive(Debug, Clone)]
pub struct FrameRangeIter {
    range: FrameRange,
    index: usize,
    len: usize,
}

impl Iterator for FrameRangeIter {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.index >= self.len {
            return None;
        }
        let frame = self.range.get(self.index);
        self.index += 1;
        frame
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameRangeIter {}
