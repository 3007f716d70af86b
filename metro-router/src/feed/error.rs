//! Feed reading errors.

use std::path::PathBuf;

/// Error reading or parsing a feed table.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// A required table could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table was present but malformed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_file() {
        let err = FeedError::Io {
            path: PathBuf::from("feed/stops.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("stops.txt"));
    }
}
