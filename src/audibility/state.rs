//! Cached audibility classification and its monotone merge order

/// Audibility of one destination sample, accumulated across every source
/// tested against it so far.
///
/// The raw `i8` values are the cache encoding shared with the host.
#[repr(i8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudibilityState {
    /// Every completed check so far found the sample occluded.
    NotAudible = -1,
    /// No source has been checked against this sample yet.
    Unknown = 0,
    /// Audible from some source beyond the near-distance threshold.
    AudibleFar = 1,
    /// Audible from some source within the near-distance threshold.
    AudibleNear = 2,
}

impl AudibilityState {
    /// Decode a cache byte. Host-seeded buffers are clamped onto the
    /// nearest valid state rather than trusted blindly.
    pub fn from_raw(raw: i8) -> Self {
        match raw {
            i8::MIN..=-1 => AudibilityState::NotAudible,
            0 => AudibilityState::Unknown,
            1 => AudibilityState::AudibleFar,
            _ => AudibilityState::AudibleNear,
        }
    }

    /// The cache encoding of this state.
    pub fn raw(self) -> i8 {
        self as i8
    }

    /// Position in the merge order:
    /// `Unknown < NotAudible < AudibleFar < AudibleNear`.
    ///
    /// `Unknown` is "no data yet" and loses to every completed check; an
    /// audible result, once found, is never replaced by a worse one.
    pub fn rank(self) -> u8 {
        match self {
            AudibilityState::Unknown => 0,
            AudibilityState::NotAudible => 1,
            AudibilityState::AudibleFar => 2,
            AudibilityState::AudibleNear => 3,
        }
    }

    /// True for the two audible classifications.
    pub fn is_audible(self) -> bool {
        matches!(self, AudibilityState::AudibleFar | AudibilityState::AudibleNear)
    }

    /// Merge two states, keeping the higher-ranked one.
    pub fn merge(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}
