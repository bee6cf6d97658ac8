use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error(
        "The 'dotnet-version' was supplied in invalid format: {0}! Supported syntax: A.B.C, A.B, A.B.x, A, A.x, A.B.Cxx"
    )]
    InvalidFormat(String),

    #[error(
        "The 'dotnet-version' was supplied in invalid format: {0}! The A.B.Cxx syntax is available since the .NET 5.0 release."
    )]
    UnsupportedMajor(String),

    #[error(
        "Value '{0}' is not supported for the 'dotnet-quality' option. Supported values are: daily, signed, validated, preview, ga."
    )]
    UnsupportedQuality(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Could not find info for version with major tag: \"{major}\" at {url}")]
    NotFound { major: String, url: String },

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
