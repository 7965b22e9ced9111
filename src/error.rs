use thiserror::Error;

/// Errors returned by [`Earcut::earcut`](crate::Earcut::earcut) and
/// [`triangulate`](crate::triangulate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Each vertex needs at least an x and a y coordinate.
    #[error("vertex dimension must be at least 2, got {0}")]
    InvalidDimension(usize),

    /// The input has more vertices than the index type can address.
    #[error("{vertices} vertices cannot be indexed, the largest index is {max_index}")]
    IndexOverflow { vertices: usize, max_index: usize },
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::InvalidDimension(1).to_string(),
            "vertex dimension must be at least 2, got 1"
        );
        assert_eq!(
            Error::IndexOverflow {
                vertices: 70000,
                max_index: 65535
            }
            .to_string(),
            "70000 vertices cannot be indexed, the largest index is 65535"
        );
    }
}
