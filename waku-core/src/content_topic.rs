//! Waku content topic.
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentTopicError {
    #[error("content topic must start with '/'")]
    MissingPrefix,
    #[error("invalid content topic format: {0}")]
    InvalidFormat(String),
    #[error("content topic generation not supported: {0}")]
    UnsupportedGeneration(String),
    #[error("content topic {0} must not be empty")]
    EmptyField(&'static str),
}

#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct ContentTopic(String);

impl ContentTopic {
    pub fn new<S>(topic: S) -> ContentTopic
    where
        S: Into<String>,
    {
        ContentTopic(topic.into())
    }

    /// Return the length in bytes of this content topic.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if this content topic is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse this content topic into its structured form.
    pub fn parse_ns(&self) -> Result<NsContentTopic, ContentTopicError> {
        self.0.parse()
    }
}

impl fmt::Debug for ContentTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ContentTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ContentTopic {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for ContentTopic {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentTopic {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A content topic following the `/{application}/{version}/{name}/{encoding}` convention,
/// optionally prefixed with a `/{generation}` segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NsContentTopic {
    pub generation: Option<u32>,
    pub application: String,
    pub version: String,
    pub name: String,
    pub encoding: String,
}

fn non_empty(field: &'static str, value: &str) -> Result<String, ContentTopicError> {
    if value.is_empty() {
        return Err(ContentTopicError::EmptyField(field));
    }
    Ok(value.to_string())
}

impl FromStr for NsContentTopic {
    type Err = ContentTopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .strip_prefix('/')
            .ok_or(ContentTopicError::MissingPrefix)?
            .split('/')
            .collect::<Vec<&str>>();

        let (generation, parts) = match parts.len() {
            4 => (None, &parts[..]),
            5 => {
                let generation = parts[0]
                    .parse::<u32>()
                    .map_err(|_| ContentTopicError::InvalidFormat(s.to_string()))?;
                if generation > 0 {
                    return Err(ContentTopicError::UnsupportedGeneration(parts[0].to_string()));
                }
                (Some(generation), &parts[1..])
            }
            _ => return Err(ContentTopicError::InvalidFormat(s.to_string())),
        };

        Ok(Self {
            generation,
            application: non_empty("application", parts[0])?,
            version: non_empty("version", parts[1])?,
            name: non_empty("name", parts[2])?,
            encoding: non_empty("encoding", parts[3])?,
        })
    }
}

impl fmt::Display for NsContentTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(generation) = self.generation {
            write!(f, "/{generation}")?;
        }
        write!(
            f,
            "/{}/{}/{}/{}",
            self.application, self.version, self.name, self.encoding
        )
    }
}

impl TryFrom<&ContentTopic> for NsContentTopic {
    type Error = ContentTopicError;

    fn try_from(topic: &ContentTopic) -> Result<Self, Self::Error> {
        topic.parse_ns()
    }
}
