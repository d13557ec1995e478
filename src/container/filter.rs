use std::fmt;
use std::str::FromStr;

use regex::Regex;

use super::{Error, Result};

/// Selects containers by the image they were created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFilter {
    /// Every image matches.
    Any,
    /// Images whose name contains this literal, case-sensitive substring.
    Substring(String),
}

impl ImageFilter {
    /// Creates a substring filter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyFilter`] for an empty substring; use
    /// [`ImageFilter::Any`] to match every image.
    pub fn substring(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::EmptyFilter);
        }
        Ok(ImageFilter::Substring(value))
    }

    pub fn matches(&self, image: &str) -> bool {
        match self {
            ImageFilter::Any => true,
            ImageFilter::Substring(value) => image.contains(value.as_str()),
        }
    }
}

impl fmt::Display for ImageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFilter::Any => f.write_str("any image"),
            ImageFilter::Substring(value) => write!(f, "images containing `{value}`"),
        }
    }
}

/// Removes a container from the stats batch when its name matches.
///
/// Parsed from `exact:<text>`, `substring:<text>` or `regex:<pattern>`; text
/// without a recognised prefix is an exact match.
#[derive(Debug, Clone)]
pub enum ExclusionRule {
    Exact(String),
    Substring(String),
    Pattern(Regex),
}

impl ExclusionRule {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            ExclusionRule::Exact(value) => name == value,
            ExclusionRule::Substring(value) => name.contains(value.as_str()),
            ExclusionRule::Pattern(regex) => regex.is_match(name),
        }
    }
}

impl fmt::Display for ExclusionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionRule::Exact(value) => write!(f, "exact:{value}"),
            ExclusionRule::Substring(value) => write!(f, "substring:{value}"),
            ExclusionRule::Pattern(regex) => write!(f, "regex:{}", regex.as_str()),
        }
    }
}

impl FromStr for ExclusionRule {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let rule = if let Some(value) = s.strip_prefix("exact:") {
            ExclusionRule::Exact(value.to_owned())
        } else if let Some(value) = s.strip_prefix("substring:") {
            ExclusionRule::Substring(value.to_owned())
        } else if let Some(pattern) = s.strip_prefix("regex:") {
            let regex = Regex::new(pattern).map_err(|source| Error::InvalidExclusionPattern {
                rule: s.to_owned(),
                source,
            })?;
            ExclusionRule::Pattern(regex)
        } else {
            ExclusionRule::Exact(s.to_owned())
        };

        let empty = match &rule {
            ExclusionRule::Exact(value) | ExclusionRule::Substring(value) => value.is_empty(),
            ExclusionRule::Pattern(regex) => regex.as_str().is_empty(),
        };
        if empty {
            return Err(Error::EmptyExclusion(s.to_owned()));
        }

        Ok(rule)
    }
}
