use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failure, preserved alongside the message so
/// callers are not forced to string-match the failure reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Manifest, lock file, or metadata could not be read or parsed
    Parse,
    /// No dependency closure satisfies the declared constraints
    Resolve,
    /// A package could not be fetched from the registry
    Fetch,
    /// A fetched package could not be verified or unpacked
    Unpack,
    /// Anything else (I/O on the target directory, configuration, ...)
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::Parse => "parse",
            FailureKind::Resolve => "resolve",
            FailureKind::Fetch => "fetch",
            FailureKind::Unpack => "unpack",
            FailureKind::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Version parsing error: {0}")]
    SemVer(#[from] semver::Error),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Dependency conflict: {0}")]
    DependencyConflict(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Checksum mismatch for {package}\nExpected: {expected}\nComputed: {computed}")]
    ChecksumMismatch {
        package: String,
        expected: String,
        computed: String,
    },

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Unpack failed: {0}")]
    Unpack(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Classify this error for the install outcome.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Json(_)
            | Error::TomlDe(_)
            | Error::TomlSer(_)
            | Error::SemVer(_)
            | Error::InvalidManifest(_) => FailureKind::Parse,
            Error::PackageNotFound(_) | Error::DependencyConflict(_) => FailureKind::Resolve,
            Error::Http(_) | Error::Fetch(_) => FailureKind::Fetch,
            Error::ChecksumMismatch { .. } | Error::Unpack(_) => FailureKind::Unpack,
            Error::Io(_) | Error::Other(_) => FailureKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::InvalidManifest("bad".into()).kind(),
            FailureKind::Parse
        );
        assert_eq!(
            Error::DependencyConflict("a vs b".into()).kind(),
            FailureKind::Resolve
        );
        assert_eq!(Error::Fetch("timeout".into()).kind(), FailureKind::Fetch);
        assert_eq!(
            Error::Unpack("truncated archive".into()).kind(),
            FailureKind::Unpack
        );
        assert_eq!(Error::Other("misc".into()).kind(), FailureKind::Other);
    }

    #[test]
    fn test_checksum_mismatch_is_unpack() {
        let err = Error::ChecksumMismatch {
            package: "left-pad".into(),
            expected: "aa".into(),
            computed: "bb".into(),
        };
        assert_eq!(err.kind(), FailureKind::Unpack);
        assert!(err.to_string().contains("left-pad"));
    }
}
