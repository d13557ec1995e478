use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

mod error;
mod filter;
mod utils;

pub use error::{Error, Result};
pub use filter::{ExclusionRule, ImageFilter};

/// The maximum allowed length for a [`ContainerID`].
const CONTAINER_ID_MAX_LEN: usize = 255;

/// A validated container identifier.
///
/// Only ASCII alphanumerics, `_`, `-` and `.` are accepted, so the id can be
/// placed into a request path verbatim.
///
/// # Examples
///
/// ```
/// # use docker_metrics::container::{ContainerID, Error};
/// let container_id = ContainerID::new("abc123").unwrap();
/// assert_eq!(container_id.as_ref(), "abc123");
/// assert!(ContainerID::new("../images/json").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerID(Arc<str>);

impl ContainerID {
    /// Creates a new `ContainerID` from the given raw id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContainerID`] if the input is empty, longer than
    /// [`CONTAINER_ID_MAX_LEN`], or contains a character that is not path-safe.
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        if src.is_empty()
            || src.len() > CONTAINER_ID_MAX_LEN
            || !utils::is_path_safe(src.as_bytes())
        {
            return Err(Error::InvalidContainerID(src.to_owned()));
        }

        Ok(Self(src.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ContainerID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContainerID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContainerID {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ContainerID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One container as reported by the runtime's container listing.
///
/// `name` is the textual form of the runtime's `Names` field. It is kept as
/// returned, list-like wrapper included, because exclusion rules are matched
/// against exactly this text. A change in how the runtime renders names
/// changes what the exclusion rules match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    name: String,
    id: ContainerID,
}

impl ContainerDescriptor {
    pub fn new(name: impl Into<String>, id: ContainerID) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    /// The raw name text.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &ContainerID {
        &self.id
    }

    /// The name without trailing whitespace, as used for labels and exclusions.
    pub fn label(&self) -> &str {
        self.name.trim_end()
    }
}
