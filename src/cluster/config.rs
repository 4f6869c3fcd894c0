use crate::{Error, Result, cluster::Endpoint};
use std::{collections::HashMap, str::FromStr};
use url::Url;

const DEFAULT_PORT: u16 = 6379;
const DEFAULT_MAX_RETRIES: u32 = 16;

/// Replica selection policy for read-only commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPreference {
    /// Always read from the master
    #[default]
    MasterOnly,
    /// Read from replicas, falling back to the master when a slot has none
    ReplicaOnly,
    /// Share reads between the master and its replicas
    Share,
}

impl FromStr for ReadPreference {
    type Err = Error;

    fn from_str(str: &str) -> Result<ReadPreference> {
        match str {
            "master-only" => Ok(ReadPreference::MasterOnly),
            "replica-only" => Ok(ReadPreference::ReplicaOnly),
            "share" => Ok(ReadPreference::Share),
            _ => Err(Error::Config(format!(
                "Cannot parse read preference from {str}"
            ))),
        }
    }
}

/// Configuration options for a [`ClusterRouter`](crate::cluster::ClusterRouter)
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Replica selection policy for read-only commands.
    ///
    /// The default is [`MasterOnly`](ReadPreference::MasterOnly)
    pub read_preference: ReadPreference,
    /// Fallback endpoint for slots the slot map does not cover,
    /// typically the bootstrap address
    pub default_endpoint: Option<Endpoint>,
    /// Retry budget of one dispatch chain, shared between redirections
    /// and transient-error retries.
    ///
    /// The default is 16
    pub max_retries: u32,
    /// Name used to tag the log entries of the router
    pub connection_name: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            read_preference: Default::default(),
            default_endpoint: None,
            max_retries: DEFAULT_MAX_RETRIES,
            connection_name: String::from(""),
        }
    }
}

impl FromStr for RouterConfig {
    type Err = Error;

    /// Build a config from an URI in the format
    /// `redis+cluster://host[:port][,host[:port]...][?param=value[&param=value...]]`
    /// or a standard address format `host`:`port`
    fn from_str(str: &str) -> Result<RouterConfig> {
        if let Some(config) = Self::parse_uri(str) {
            Ok(config)
        } else if let Some((host, port)) = Self::parse_addr(str) {
            Ok(RouterConfig {
                default_endpoint: Some(Endpoint::from_host_port(host, port)),
                ..Default::default()
            })
        } else {
            Err(Error::Config(format!("Cannot parse config from {str}")))
        }
    }
}

impl RouterConfig {
    /// Build a config from a parsed URL
    pub fn from_uri(uri: Url) -> Result<RouterConfig> {
        Self::from_str(uri.as_str())
    }

    /// Parse address in the standard format `host`:`port`
    fn parse_addr(str: &str) -> Option<(&str, u16)> {
        let mut iter = str.split(':');

        match (iter.next(), iter.next(), iter.next()) {
            (Some(host), Some(port), None) => {
                if let Ok(port) = port.parse::<u16>() {
                    Some((host, port))
                } else {
                    None
                }
            }
            (Some(host), None, None) => Some((host, DEFAULT_PORT)),
            _ => None,
        }
    }

    fn parse_uri(uri: &str) -> Option<RouterConfig> {
        let (scheme, hosts, mut query) = Self::break_down_uri(uri)?;

        match scheme {
            "redis" | "redis+cluster" | "redis-cluster" => (),
            _ => {
                return None;
            }
        }

        // the first host is the bootstrap address, kept as the
        // fallback endpoint for uncovered slots
        let (host, port) = hosts.first()?;

        let mut config = RouterConfig {
            default_endpoint: Some(Endpoint::from_host_port(host, *port)),
            ..Default::default()
        };

        if let Some(ref mut query) = query {
            if let Some(read_preference) = query.remove("read_preference") {
                if let Ok(read_preference) = read_preference.parse() {
                    config.read_preference = read_preference;
                }
            }

            if let Some(max_retries) = query.remove("max_retries") {
                if let Ok(max_retries) = max_retries.parse::<u32>() {
                    config.max_retries = max_retries;
                }
            }

            if let Some(connection_name) = query.remove("connection_name") {
                config.connection_name = connection_name;
            }
        }

        Some(config)
    }

    /// break down an uri in a tuple (scheme, hosts, query)
    fn break_down_uri(
        uri: &str,
    ) -> Option<(&str, Vec<(&str, u16)>, Option<HashMap<String, String>>)> {
        let end_of_scheme = uri.find("://")?;
        let scheme = &uri[..end_of_scheme];
        let after_scheme = &uri[end_of_scheme + 3..];

        let (before_query, query) = match after_scheme.find('?') {
            Some(index) => (&after_scheme[..index], Some(&after_scheme[index + 1..])),
            None => (after_scheme, None),
        };

        let authority = match before_query.find('/') {
            Some(index) => &before_query[..index],
            None => before_query,
        };

        let mut hosts = Vec::new();
        for host in authority.split(',') {
            hosts.push(Self::parse_addr(host)?);
        }

        let query = query.map(|query| {
            query
                .split('&')
                .filter_map(|kv| kv.split_once('=').map(|(k, v)| (k.to_owned(), v.to_owned())))
                .collect::<HashMap<_, _>>()
        });

        Some((scheme, hosts, query))
    }
}

/// Generic trait to transform a value into a [`RouterConfig`]
pub trait IntoConfig {
    fn into_config(self) -> Result<RouterConfig>;
}

impl IntoConfig for &str {
    fn into_config(self) -> Result<RouterConfig> {
        RouterConfig::from_str(self)
    }
}

impl IntoConfig for String {
    fn into_config(self) -> Result<RouterConfig> {
        RouterConfig::from_str(&self)
    }
}

impl IntoConfig for Url {
    fn into_config(self) -> Result<RouterConfig> {
        RouterConfig::from_uri(self)
    }
}

impl IntoConfig for RouterConfig {
    fn into_config(self) -> Result<RouterConfig> {
        Ok(self)
    }
}
