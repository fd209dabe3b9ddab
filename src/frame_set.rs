use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::frame_range::{FrameRange, FrameRangeIter};
use crate::padding::Padding;

/// An ordered concatenation of frame ranges sharing one padding.
///
/// ```text
/// 1-10
/// 1-10,20-30x2
/// 1-10,-4,8--8x-1
/// ```
///
/// The set's padding is adopted from the first appended range; every later
/// append must combine compatibly, and the combined padding is written
/// back through all contained ranges. An empty set carries invalid
/// padding.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    ranges: Vec<FrameRange>,
    padding: Padding,
}

/// Working element of normalization: a still-loose frame or an already
/// materialized progression.
enum Cell {
    Flat(i32),
    Run(FrameRange),
}

struct Candidate {
    start: usize,
    root: i64,
    count: usize,
    step: Option<i64>,
    open: bool,
}

impl FrameSet {
    pub fn new() -> FrameSet {
        FrameSet::default()
    }

    /// Parse a comma-separated list of frame ranges. The empty string is
    /// the empty set.
    pub fn parse(s: &str) -> Result<FrameSet> {
        let mut set = FrameSet::new();
        if s.is_empty() {
            return Ok(set);
        }
        for part in s.split(',') {
            if part.is_empty() {
                return Err(Error::parse("frame set", s));
            }
            set.append(FrameRange::parse(part)?)?;
        }
        Ok(set)
    }

    /// Parse a frame set and force an explicit padding width onto it.
    pub fn parse_with_padding(s: &str, digits: u32) -> Result<FrameSet> {
        let mut set = FrameSet::parse(s)?;
        set.set_padding(Padding::explicit(digits));
        Ok(set)
    }

    /// True if `s` parses as a frame set.
    pub fn is_sequence(s: &str) -> bool {
        FrameSet::parse(s).is_ok()
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Overwrite the padding of the set and of every contained range.
    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
        for range in &mut self.ranges {
            range.set_padding(padding);
        }
    }

    pub fn ranges(&self) -> &[FrameRange] {
        &self.ranges
    }

    /// Append a range, combining paddings. An empty set adopts the
    /// incoming padding as-is.
    pub fn append(&mut self, mut range: FrameRange) -> Result<()> {
        if self.ranges.is_empty() {
            self.padding = range.padding();
        } else {
            let combined = self.padding.combine(range.padding());
            if !combined.is_valid() {
                return Err(Error::PaddingMismatch);
            }
            self.set_padding(combined);
            range.set_padding(combined);
        }
        self.ranges.push(range);
        Ok(())
    }

    /// Total number of frames over all ranges.
    pub fn size(&self) -> usize {
        self.ranges.iter().map(FrameRange::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.iter().all(FrameRange::is_empty)
    }

    /// Frame at `index`; negative indices count back from the end.
    pub fn get(&self, index: isize) -> Option<i32> {
        let mut index = index;
        if index < 0 {
            index += self.size() as isize;
            if index < 0 {
                return None;
            }
        }
        let mut index = index as usize;
        for range in &self.ranges {
            let len = range.size();
            if index < len {
                return range.get(index);
            }
            index -= len;
        }
        None
    }

    pub fn contains(&self, frame: i32) -> bool {
        self.ranges.iter().any(|range| range.contains(frame))
    }

    /// Flat index of `frame` across the concatenated ranges.
    pub fn index_of(&self, frame: i32) -> Option<usize> {
        let mut accum = 0usize;
        for range in &self.ranges {
            if let Some(index) = range.index_of(frame) {
                return Some(accum + index);
            }
            accum += range.size();
        }
        None
    }

    /// Nearest member frames strictly left and right of `frame`, across
    /// all ranges: the overall left is the largest per-range left, the
    /// overall right the smallest per-range right.
    pub fn nearest(&self, frame: i32) -> (Option<i32>, Option<i32>) {
        let mut left: Option<i32> = None;
        let mut right: Option<i32> = None;
        for range in &self.ranges {
            let (range_left, range_right) = range.nearest(frame);
            left = match (left, range_left) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
            right = match (right, range_right) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
        (left, right)
    }

    pub fn iter(&self) -> FrameSetIter<'_> {
        FrameSetIter {
            ranges: self.ranges.iter(),
            current: None,
        }
    }

    /// Reduce the set to its canonical compact form.
    ///
    /// Every frame is exploded out, de-duplicated and sorted, then the
    /// best arithmetic progression is repeatedly carved out of the loose
    /// frames: highest frame count first, larger step on ties. A winning
    /// progression of exactly two frames is kept as two singletons (`1,3`
    /// reads better than `1-3x2`). Original frame order is lost.
    pub fn normalize(&mut self) {
        // Expensive for long sequences; skip the obviously-normal cases.
        if self.is_normal() {
            return;
        }

        let unique: HashSet<i32> = self.iter().collect();
        let mut frames: Vec<i32> = unique.into_iter().collect();
        frames.sort_unstable();
        let mut cells: Vec<Cell> = frames.into_iter().map(Cell::Flat).collect();
        let padding = self.padding;

        loop {
            let mut candidates: Vec<Candidate> = Vec::new();
            for (pos, cell) in cells.iter().enumerate() {
                match cell {
                    Cell::Flat(frame) => {
                        let frame = *frame as i64;
                        for candidate in candidates.iter_mut().filter(|c| c.open) {
                            match candidate.step {
                                // the second frame fixes the step
                                None => {
                                    candidate.step = Some(frame - candidate.root);
                                    candidate.count += 1;
                                }
                                Some(step) => {
                                    if frame == candidate.root + candidate.count as i64 * step {
                                        candidate.count += 1;
                                    } else {
                                        candidate.open = false;
                                    }
                                }
                            }
                        }
                        candidates.push(Candidate {
                            start: pos,
                            root: frame,
                            count: 1,
                            step: None,
                            open: true,
                        });
                    }
                    // a materialized run closes every open candidate
                    Cell::Run(_) => {
                        for candidate in &mut candidates {
                            candidate.open = false;
                        }
                    }
                }
            }

            let mut best: Option<(usize, i64, usize, i64)> = None;
            for candidate in &candidates {
                let step = candidate.step.unwrap_or(1);
                let wins = match best {
                    None => true,
                    Some((_, _, best_count, best_step)) => {
                        candidate.count > best_count
                            || (candidate.count == best_count && step > best_step)
                    }
                };
                if wins {
                    best = Some((candidate.start, candidate.root, candidate.count, step));
                }
            }
            let Some((start, root, count, step)) = best else {
                break;
            };

            let out = root + (count as i64 - 1) * step;
            let replacement = if count == 2 {
                vec![
                    Cell::Run(FrameRange::single(root as i32, padding)),
                    Cell::Run(FrameRange::single(out as i32, padding)),
                ]
            } else {
                vec![Cell::Run(FrameRange::run(
                    root as i32,
                    out as i32,
                    step as i32,
                    padding,
                ))]
            };
            cells.splice(start..start + count, replacement);
        }

        self.ranges = cells
            .into_iter()
            .map(|cell| match cell {
                Cell::Run(range) => range,
                Cell::Flat(frame) => FrameRange::single(frame, padding),
            })
            .collect();
    }

    // Quick opt-out for known pre-normalized shapes. Subject to false
    // negatives, never false positives.
    fn is_normal(&self) -> bool {
        match self.ranges.as_slice() {
            [] => true,
            [only] => {
                only.step() >= 0
                    && only.out_time() as i64 != only.in_time() as i64 + only.step() as i64
            }
            _ => false,
        }
    }

    /// Whether `other` could be merged in: compatible padding, or either
    /// side empty.
    pub fn can_merge(&self, other: &FrameSet) -> bool {
        self.ranges.is_empty()
            || other.ranges.is_empty()
            || self.padding.combine(other.padding).is_valid()
    }

    /// Merge `other`'s frames into this set, then normalize unless the
    /// fast path (appending the immediately-next frame to a growing
    /// forward range) applied.
    ///
    /// Merging into an empty receiver leaves it empty; merging an empty
    /// argument is a no-op.
    pub fn merge(&mut self, other: &FrameSet) -> Result<()> {
        if self.merge_without_normalize(other)? {
            self.normalize();
        }
        Ok(())
    }

    /// Batch merge; normalization is deferred to the end and runs at most
    /// once. A padding mismatch anywhere in the batch fails the call
    /// before any operand is folded in, leaving the set untouched.
    pub fn merge_multiple(&mut self, others: &[FrameSet]) -> Result<()> {
        // Validate the whole padding chain up front. An empty receiver
        // absorbs nothing and an empty operand contributes nothing, so
        // only the non-empty combination can fail.
        if !self.ranges.is_empty() {
            let mut combined = self.padding;
            for other in others.iter().filter(|other| !other.ranges.is_empty()) {
                combined = combined.combine(other.padding);
                if !combined.is_valid() {
                    return Err(Error::PaddingMismatch);
                }
            }
        }

        let mut need_normalize = false;
        for other in others {
            need_normalize |= self.merge_without_normalize(other)?;
        }
        if need_normalize {
            self.normalize();
        }
        Ok(())
    }

    fn merge_without_normalize(&mut self, other: &FrameSet) -> Result<bool> {
        if !self.can_merge(other) {
            return Err(Error::PaddingMismatch);
        }
        if !self.ranges.is_empty() && !other.ranges.is_empty() {
            let combined = self.padding.combine(other.padding);
            self.set_padding(combined);
        }

        // Common case: the incoming set is the single frame right after
        // the end of our single forward range. Extend in place.
        if self.ranges.len() == 1 && other.ranges.len() == 1 {
            let back = self.ranges[0];
            let incoming = other.ranges[0];
            if back.step() > 0
                && !back.invert_step()
                && incoming.size() == 1
                && incoming.in_time() as i64 == back.out_time() as i64 + back.step() as i64
            {
                self.ranges[0].extend_by_step();
                return Ok(false);
            }
        }

        if self.ranges.is_empty() || other.ranges.is_empty() {
            return Ok(false);
        }

        let padding = self.padding;
        self.ranges.extend(other.ranges.iter().map(|range| {
            let mut range = *range;
            range.set_padding(padding);
            range
        }));
        Ok(true)
    }
}

impl PartialEq for FrameSet {
    /// Padding compares by *compatibility*, not strict equality; two empty
    /// sets (both carrying invalid padding) are equal.
    fn eq(&self, other: &Self) -> bool {
        (self.padding == other.padding || self.padding.combine(other.padding).is_valid())
            && self.ranges == other.ranges
    }
}

impl fmt::Display for FrameSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for range in &self.ranges {
            if range.is_empty() {
                continue;
            }
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{range}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for FrameSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<FrameSet> {
        FrameSet::parse(s)
    }
}

/// Iterator over the frames of a [`FrameSet`], range by range.
pub struct FrameSetIter<'a> {
    ranges: std::slice::Iter<'a, FrameRange>,
    current: Option<FrameRangeIter>,
}

impl Iterator for FrameSetIter<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        loop {
            if let Some(inner) = &mut self.current {
                if let Some(frame) = inner.next() {
                    return Some(frame);
                }
            }
            self.current = Some(self.ranges.next()?.iter());
        }
    }
}
