//! Sliding temporal windows over an ordered frame sequence.
//!
//! A window of `size` consecutive frames is centered on the frame being
//! analyzed, so only centers in `[size/2, N-1-size/2]` produce a window.
//! Iteration is lazy and borrows the frames; cloning the iterator (or calling
//! [`temporal_windows`] again) restarts it.

use crate::frame::Frame;

/// A run of consecutive frames centered on `center_index`.
#[derive(Clone, Copy, Debug)]
pub struct TemporalWindow<'a> {
    /// Index of the center frame in the original sequence.
    pub center_index: usize,
    /// Exactly `size` frames, in sequence order.
    pub frames: &'a [Frame],
}

impl<'a> TemporalWindow<'a> {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the first frame in the original sequence.
    pub fn start_index(&self) -> usize {
        self.center_index - self.frames.len() / 2
    }

    pub fn center(&self) -> &'a Frame {
        &self.frames[self.frames.len() / 2]
    }
}

/// Lazy iterator over the temporal windows of a frame slice.
#[derive(Clone, Debug)]
pub struct TemporalWindows<'a> {
    frames: &'a [Frame],
    size: usize,
    next_start: usize,
}

impl<'a> Iterator for TemporalWindows<'a> {
    type Item = TemporalWindow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.size == 0 || self.next_start + self.size > self.frames.len() {
            return None;
        }
        let start = self.next_start;
        self.next_start += 1;
        Some(TemporalWindow {
            center_index: start + self.size / 2,
            frames: &self.frames[start..start + self.size],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = window_count(self.frames.len(), self.size).saturating_sub(self.next_start);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TemporalWindows<'_> {}

/// Slice `frames` into windows of `size` consecutive frames.
///
/// Yields `N - size + 1` windows, or none when `N < size`. A zero size
/// yields nothing.
pub fn temporal_windows(frames: &[Frame], size: usize) -> TemporalWindows<'_> {
    TemporalWindows {
        frames,
        size,
        next_start: 0,
    }
}

/// Number of windows [`temporal_windows`] produces for `n` frames.
pub fn window_count(n: usize, size: usize) -> usize {
    if size == 0 || n < size {
        0
    } else {
        n - size + 1
    }
}
