//! Track identities, observation sources and object classes
//!
//! Uids keep a track recognisable across ticks; source labels record who
//! reported an observation; object classes are the typed result of label
//! association.

// ============================================================================
// Track Uid
// ============================================================================

/// A unique, monotonically allocated track identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uid(pub u64);

impl Uid {
    /// Sentinel for "no track selected".
    pub const INVALID: Uid = Uid(u64::MAX);

    /// True unless this is [`Uid::INVALID`].
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != u64::MAX
    }
}

impl core::fmt::Display for Uid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#invalid")
        }
    }
}

/// Allocates uids in increasing order, starting at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidGenerator {
    next: u64,
}

impl UidGenerator {
    /// Creates a generator whose first uid is 0.
    #[inline]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocates the next uid.
    #[inline]
    pub fn next_uid(&mut self) -> Uid {
        let uid = Uid(self.next);
        // u64::MAX is reserved for Uid::INVALID
        self.next = (self.next + 1) % u64::MAX;
        uid
    }

    /// Uid the next call to [`next_uid`](Self::next_uid) returns.
    #[inline]
    pub fn peek(&self) -> Uid {
        Uid(self.next)
    }
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Source Label
// ============================================================================

/// Who reported an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceLabel {
    /// Own vision, or unknown origin
    #[default]
    Vision,
    /// Self-position shared by the teammate at this index
    Teammate(u8),
}

impl SourceLabel {
    /// Numeric label: 0 for vision, teammate index + 1 otherwise.
    #[inline]
    pub fn code(&self) -> u32 {
        match self {
            SourceLabel::Vision => 0,
            SourceLabel::Teammate(index) => u32::from(*index) + 1,
        }
    }

    /// True for teammate-shared observations.
    #[inline]
    pub fn is_teammate(&self) -> bool {
        matches!(self, SourceLabel::Teammate(_))
    }
}

// ============================================================================
// Object Class
// ============================================================================

/// Classification of a tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectClass {
    /// Confirmed by shared teammate positions
    OwnTeam,
    /// Only ever seen by vision
    OpposingTeam,
    /// Mixed or insufficient evidence
    #[default]
    Unknown,
}

impl ObjectClass {
    /// Classifies an accumulated label score in [0, 1].
    ///
    /// Scores at or above `labelbound` mean own team; a score of exactly zero
    /// (no teammate ever reported the object) means opposing team.
    pub fn from_label_score(score: f64, labelbound: f64) -> Self {
        if score >= labelbound {
            ObjectClass::OwnTeam
        } else if score <= 0.0 {
            ObjectClass::OpposingTeam
        } else {
            ObjectClass::Unknown
        }
    }
}
