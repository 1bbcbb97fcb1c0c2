use std::fmt;

use crate::pubsub_topic::PubsubTopic;

const TOPIC_NAMED_SHARDING_PREFIX: &str = "/waku/2/";
const TOPIC_STATIC_SHARDING_PREFIX: &str = "/waku/2/rs/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NsPubsubTopicError {
    #[error("invalid prefix")]
    InvalidPrefix,
    #[error("missing cluster index")]
    MissingCluster,
    #[error("invalid cluster index")]
    InvalidCluster,
    #[error("missing shard index")]
    MissingShard,
    #[error("invalid shard index")]
    InvalidShard,
    #[error("too many parts")]
    TooManyParts,
}

/// A pubsub topic following one of the Waku namespacing conventions.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum NsPubsubTopic {
    StaticSharding { cluster: u16, shard: u16 },
    NamedSharding(String),
    Raw(String),
}

fn parse_static_sharding(topic: &str) -> Result<(u16, u16), NsPubsubTopicError> {
    let mut parts = topic
        .strip_prefix(TOPIC_STATIC_SHARDING_PREFIX)
        .ok_or(NsPubsubTopicError::InvalidPrefix)?
        .split('/');

    let cluster = match parts.next() {
        None | Some("") => return Err(NsPubsubTopicError::MissingCluster),
        Some(part) => part
            .parse::<u16>()
            .map_err(|_| NsPubsubTopicError::InvalidCluster)?,
    };
    let shard = match parts.next() {
        None | Some("") => return Err(NsPubsubTopicError::MissingShard),
        Some(part) => part
            .parse::<u16>()
            .map_err(|_| NsPubsubTopicError::InvalidShard)?,
    };

    if parts.next().is_some() {
        return Err(NsPubsubTopicError::TooManyParts);
    }

    Ok((cluster, shard))
}

impl NsPubsubTopic {
    pub fn new_static_sharding(cluster: u16, shard: u16) -> Self {
        Self::StaticSharding { cluster, shard }
    }

    pub fn new_named_sharding<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self::NamedSharding(name.into())
    }
}

impl std::str::FromStr for NsPubsubTopic {
    type Err = NsPubsubTopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(TOPIC_STATIC_SHARDING_PREFIX) {
            return parse_static_sharding(s)
                .map(|(cluster, shard)| Self::StaticSharding { cluster, shard });
        }

        if let Some(name) = s.strip_prefix(TOPIC_NAMED_SHARDING_PREFIX) {
            return Ok(Self::NamedSharding(name.to_string()));
        }

        Ok(Self::Raw(s.to_string()))
    }
}

impl fmt::Display for NsPubsubTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticSharding { cluster, shard } => {
                write!(f, "{TOPIC_STATIC_SHARDING_PREFIX}{cluster}/{shard}")
            }
            Self::NamedSharding(name) => write!(f, "{TOPIC_NAMED_SHARDING_PREFIX}{name}"),
            Self::Raw(name) => f.write_str(name),
        }
    }
}

impl fmt::Debug for NsPubsubTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticSharding { cluster, shard } => {
                write!(f, "StaticSharding(cluster={cluster},shard={shard})")
            }
            Self::NamedSharding(name) => write!(f, "NamedSharding({name})"),
            Self::Raw(name) => write!(f, "Raw({name})"),
        }
    }
}

impl TryFrom<&PubsubTopic> for NsPubsubTopic {
    type Error = NsPubsubTopicError;

    fn try_from(topic: &PubsubTopic) -> Result<Self, Self::Error> {
        topic.as_str().parse()
    }
}

impl From<NsPubsubTopic> for PubsubTopic {
    fn from(topic: NsPubsubTopic) -> Self {
        PubsubTopic::new(topic.to_string())
    }
}
