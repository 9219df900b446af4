//! Priority levels for override rules and composite member ordering.

/// Ordered priority levels. The numeric rank is the tie-break currency for
/// replace rules and the bucket key for composite member ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PriorityLevel {
    /// Rank -200.
    VeryLow,
    /// Rank -100.
    Low,
    /// Rank 0.
    #[default]
    Default,
    /// Rank 100.
    High,
    /// Rank 200.
    VeryHigh,
}

impl PriorityLevel {
    /// All levels from highest to lowest, the concatenation order used when
    /// emitting composite members.
    pub const DESCENDING: [Self; 5] =
        [Self::VeryHigh, Self::High, Self::Default, Self::Low, Self::VeryLow];

    /// Numeric rank of this level.
    #[must_use]
    pub fn rank(self) -> i32 {
        match self {
            Self::VeryLow => -200,
            Self::Low => -100,
            Self::Default => 0,
            Self::High => 100,
            Self::VeryHigh => 200,
        }
    }

    /// Parses a priority marker filename (`priorityVeryHigh`, `priorityHigh`,
    /// `priorityDefault`, `priorityLow`, `priorityVeryLow`), ignoring case
    /// and `_`/`-`/`.` separators. Returns `None` for anything else.
    #[must_use]
    pub fn from_marker_name(name: &str) -> Option<Self> {
        let normalized: String =
            name.chars().filter(char::is_ascii_alphanumeric).map(|c| c.to_ascii_lowercase()).collect();
        match normalized.as_str() {
            "priorityveryhigh" => Some(Self::VeryHigh),
            "priorityhigh" => Some(Self::High),
            "prioritydefault" => Some(Self::Default),
            "prioritylow" => Some(Self::Low),
            "priorityverylow" => Some(Self::VeryLow),
            _ => None,
        }
    }
}
