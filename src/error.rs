use thiserror::Error;

/// Errors surfaced to callers of the screening pipeline.
///
/// Upstream failures never show up here; they degrade individual rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenerError {
    #[error("nothing to display: no symbols left after trimming and de-duplication")]
    InvalidSymbolSet,
}
