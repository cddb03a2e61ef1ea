//! Fixed-capacity circular buffers
//!
//! Every smoothing site of the trackers (smoothed confidence, label score,
//! feature history) is built on [`RingBuffer`].

/// A fixed-capacity circular buffer.
///
/// Pushing into a full buffer overwrites the oldest element. The number of
/// valid elements is tracked separately from the capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingBuffer<T: Copy, const N: usize> {
    slots: [T; N],
    /// Index the next element is written to
    head: usize,
    /// Number of valid elements
    len: usize,
}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    /// Creates an empty buffer whose slots hold `fill`.
    pub const fn new(fill: T) -> Self {
        Self {
            slots: [fill; N],
            head: 0,
            len: 0,
        }
    }

    /// Creates a buffer whose every slot is a valid `value`.
    pub const fn filled(value: T) -> Self {
        Self {
            slots: [value; N],
            head: 0,
            len: N,
        }
    }

    /// Appends an element, overwriting the oldest one when full.
    pub fn push(&mut self, value: T) {
        if N == 0 {
            return;
        }
        self.slots[self.head] = value;
        self.head = (self.head + 1) % N;
        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of valid elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no element has been pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of elements.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The most recently pushed element.
    pub fn latest(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        Some(&self.slots[(self.head + N - 1) % N])
    }

    /// Iterates over the valid elements, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let start = (self.head + N - self.len) % N.max(1);
        (0..self.len).map(move |i| &self.slots[(start + i) % N])
    }

    /// Forgets every element.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

// ============================================================================
// Moving Average
// ============================================================================

/// Fixed-window running mean over the last `N` samples.
///
/// The window starts out fully populated with a seed value, so the mean is
/// always taken over `N` samples and there is no start-up ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingAverage<const N: usize> {
    window: RingBuffer<f64, N>,
    mean: f64,
}

impl<const N: usize> MovingAverage<N> {
    /// Creates a moving average with every window slot set to `seed`.
    pub const fn seeded(seed: f64) -> Self {
        Self {
            window: RingBuffer::filled(seed),
            mean: seed,
        }
    }

    /// Adds a sample and returns the new mean.
    pub fn push(&mut self, sample: f64) -> f64 {
        self.window.push(sample);
        self.mean = if N == 0 {
            sample
        } else {
            self.window.iter().sum::<f64>() / N as f64
        };
        self.mean
    }

    /// Current mean over the full window.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }
}
