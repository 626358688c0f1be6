use thiserror::Error;

use crate::core::stepper::Phase;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the particle core and its scenario loader.
///
/// `step` never returns an error: degenerate pairs are absorbed and reported through
/// [`crate::core::StepReport`]. `DegenerateGeometry` exists so those reports can be logged
/// and, on request, turned into a hard failure via [`crate::core::StepReport::check`].
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration or initial state, rejected before the first step.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Two particles at (numerically) the same position, so the pair direction is undefined.
    #[error("degenerate geometry between particles {i} and {j} during {phase}")]
    DegenerateGeometry { i: usize, j: usize, phase: Phase },

    /// Malformed scenario document.
    #[error("scenario parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Propagated I/O errors (scenario files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidConfiguration("radius must be finite and > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid configuration"));
        assert!(msg.contains("radius"));
    }

    #[test]
    fn degenerate_display_names_pair_and_phase() {
        let e = Error::DegenerateGeometry {
            i: 3,
            j: 7,
            phase: Phase::Collision,
        };
        let msg = e.to_string();
        assert!(msg.contains('3') && msg.contains('7'));
        assert!(msg.contains("collision"));
    }

    #[test]
    fn result_type_alias_compiles() -> Result<()> {
        Ok(())
    }
}
