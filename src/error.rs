use thiserror::Error;

/// Errors reported while building a diagram or setting up a pitch.
///
/// Clipping never fails: a cell without a visible part on the pitch is
/// reported as [`crate::ClippedRegion::Empty`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// Two sites lie within the tolerance of each other. The caller has to
    /// deduplicate or perturb the input before retrying.
    #[error("sites {first} and {second} coincide at ({:.6}, {:.6})", .position[0], .position[1])]
    DuplicateSite {
        first: usize,
        second: usize,
        position: [f64; 2],
    },

    /// The cell of `site` could not be resolved numerically.
    #[error("degenerate geometry for site {site}: {reason}")]
    DegenerateGeometry { site: usize, reason: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInput {
    #[error("at least one site is required")]
    NoSites,

    #[error("site {index} has non-finite coordinates ({}, {})", .position[0], .position[1])]
    NonFiniteSite { index: usize, position: [f64; 2] },

    #[error("boundary must have positive, finite dimensions (got {length} x {width})")]
    MalformedBoundary { length: f64, width: f64 },

    #[error("{name} must be positive and finite (got {value})")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("coordinates come in (x, y) pairs, got {length} values")]
    UnpairedCoordinates { length: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_names_indices() {
        let err = Error::DuplicateSite { first: 3, second: 7, position: [1.0, 2.0] };
        let msg = err.to_string();
        assert!(msg.contains('3') && msg.contains('7'), "{}", msg);
    }

    #[test]
    fn test_invalid_input_converts() {
        let err: Error = InvalidInput::NoSites.into();
        assert_eq!(err, Error::InvalidInput(InvalidInput::NoSites));
    }
}
