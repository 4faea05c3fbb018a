use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReelError {
    #[error("source batch unavailable: {0}")]
    SourceUnavailable(String),
    #[error("no usable watch records in any source")]
    EmptyDataset,
    #[error("invalid watch instant: {0}")]
    InvalidInstant(String),
}

/// Why a single candidate record was dropped. A skip never aborts the batch;
/// it only increments the per-reason counter reported at the end of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkipReason {
    MissingLink,
    MissingDate,
    MissingTitle,
    InvalidInstant,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingLink => "MISSING_LINK",
            Self::MissingDate => "MISSING_DATE",
            Self::MissingTitle => "MISSING_TITLE",
            Self::InvalidInstant => "INVALID_INSTANT",
        }
    }
}
