#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid container id: `{0}`")]
    InvalidContainerID(String),
    #[error("image filter must not be empty")]
    EmptyFilter,
    #[error("invalid exclusion rule `{0}`: missing value")]
    EmptyExclusion(String),
    #[error("invalid exclusion rule `{rule}`: {source}")]
    InvalidExclusionPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}
pub type Result<T> = std::result::Result<T, Error>;
