use thiserror::Error;

pub type Result<T> = std::result::Result<T, RadarError>;

/// Everything that can stop a chart (or a whole session) from rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadarError {
    /// Input file missing, unreadable or malformed. Fatal to the session.
    #[error("dataset unavailable ({path}): {reason}")]
    DataUnavailable { path: String, reason: String },

    #[error("Please select at least one player to show radar plots.")]
    NoPlayersSelected,

    #[error("Need at least {min} variables to make a radar chart (got {got}).")]
    InsufficientAxes { got: usize, min: usize },

    #[error("No columns found starting with 'cat.'")]
    NoCategoryColumns,

    #[error("At most {max} metrics can be selected (got {got}).")]
    TooManyMetrics { got: usize, max: usize },

    #[error("At most {max} players can be selected (got {got}).")]
    TooManyPlayers { got: usize, max: usize },

    #[error("unknown position role: {0}")]
    UnknownRole(String),

    #[error("column not found in dataset: {0}")]
    UnknownColumn(String),

    #[error("column is not numeric: {0}")]
    NonNumericColumn(String),
}

/// How loudly a condition should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl RadarError {
    pub fn unavailable(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Only a failed load ends the session; everything else is scoped to a
    /// selection or a single chart section.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. })
    }

    pub fn notice_level(&self) -> NoticeLevel {
        match self {
            Self::DataUnavailable { .. } => NoticeLevel::Error,
            Self::NoCategoryColumns => NoticeLevel::Info,
            Self::UnknownColumn(_) | Self::NonNumericColumn(_) => NoticeLevel::Error,
            _ => NoticeLevel::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_data_unavailable_is_fatal() {
        assert!(RadarError::unavailable("x.csv", "missing").is_fatal());
        assert!(!RadarError::NoPlayersSelected.is_fatal());
        assert!(!RadarError::InsufficientAxes { got: 2, min: 3 }.is_fatal());
        assert_eq!(
            RadarError::NoCategoryColumns.notice_level(),
            NoticeLevel::Info
        );
    }
}
