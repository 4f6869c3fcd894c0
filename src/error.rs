use std::fmt::{Display, Formatter};

/// All error kinds
#[derive(Debug)]
pub enum Error {
    /// Raised if an error occurs within the router
    Client(String),
    /// Raised if an error occurs in the [`RouterConfig`](crate::cluster::RouterConfig) parsing
    Config(String),
    /// Error returned by the Redis server
    Redis(RedisError),
    /// IO error surfaced by the connection layer
    IO(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Client(e) => f.write_fmt(format_args!("Client error: {}", e)),
            Error::Config(e) => f.write_fmt(format_args!("Config error: {}", e)),
            Error::Redis(e) => f.write_fmt(format_args!("Redis error: {}", e)),
            Error::IO(e) => f.write_fmt(format_args!("IO error: {}", e)),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IO(e)
    }
}

/// Redis server error kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedisErrorKind {
    Ask {
        hash_slot: u16,
        address: (String, u16),
    },
    BusyGroup,
    ClusterDown,
    CrossSlot,
    Err,
    InProg,
    IoErr,
    MasterDown,
    MisConf,
    Moved {
        hash_slot: u16,
        address: (String, u16),
    },
    NoAuth,
    NoPerm,
    NoProto,
    NoScript,
    NotBusy,
    OutOfMemory,
    Readonly,
    TryAgain,
    WrongType,
    Other(String),
}

impl From<&str> for RedisErrorKind {
    fn from(str: &str) -> Self {
        match str {
            "BUSYGROUP" => Self::BusyGroup,
            "CLUSTERDOWN" => Self::ClusterDown,
            "CROSSSLOT" => Self::CrossSlot,
            "ERR" => Self::Err,
            "INPROG" => Self::InProg,
            "IOERR" => Self::IoErr,
            "MASTERDOWN" => Self::MasterDown,
            "MISCONF" => Self::MisConf,
            "NOAUTH" => Self::NoAuth,
            "NOPERM" => Self::NoPerm,
            "NOPROTO" => Self::NoProto,
            "NOSCRIPT" => Self::NoScript,
            "NOTBUSY" => Self::NotBusy,
            "OOM" => Self::OutOfMemory,
            "READONLY" => Self::Readonly,
            "TRYAGAIN" => Self::TryAgain,
            "WRONGTYPE" => Self::WrongType,
            _ => {
                let mut iter = str.split_whitespace();
                match (iter.next(), iter.next(), iter.next(), iter.next()) {
                    (Some(kind @ ("ASK" | "MOVED")), Some(hash_slot), Some(address), None) => {
                        // a redirection whose tokens cannot be parsed is
                        // surfaced verbatim instead of being recovered
                        let Ok(hash_slot) = hash_slot.parse::<u16>() else {
                            return Self::Other(str.to_owned());
                        };
                        let Some((host, port)) = address.split_once(':') else {
                            return Self::Other(str.to_owned());
                        };
                        let Ok(port) = port.parse::<u16>() else {
                            return Self::Other(str.to_owned());
                        };
                        let address = (host.to_owned(), port);
                        if kind == "ASK" {
                            Self::Ask { hash_slot, address }
                        } else {
                            Self::Moved { hash_slot, address }
                        }
                    }
                    _ => Self::Other(str.to_owned()),
                }
            }
        }
    }
}

impl Display for RedisErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RedisErrorKind::Ask {
                hash_slot,
                address: (host, port),
            } => f.write_fmt(format_args!("ASK {} {}:{}", *hash_slot, *host, *port)),
            RedisErrorKind::BusyGroup => f.write_str("BUSYGROUP"),
            RedisErrorKind::ClusterDown => f.write_str("CLUSTERDOWN"),
            RedisErrorKind::CrossSlot => f.write_str("CROSSSLOT"),
            RedisErrorKind::Err => f.write_str("ERR"),
            RedisErrorKind::InProg => f.write_str("INPROG"),
            RedisErrorKind::IoErr => f.write_str("IOERR"),
            RedisErrorKind::MasterDown => f.write_str("MASTERDOWN"),
            RedisErrorKind::MisConf => f.write_str("MISCONF"),
            RedisErrorKind::Moved {
                hash_slot,
                address: (host, port),
            } => f.write_fmt(format_args!("MOVED {} {}:{}", *hash_slot, *host, *port)),
            RedisErrorKind::NoAuth => f.write_str("NOAUTH"),
            RedisErrorKind::NoPerm => f.write_str("NOPERM"),
            RedisErrorKind::NoProto => f.write_str("NOPROTO"),
            RedisErrorKind::NoScript => f.write_str("NOSCRIPT"),
            RedisErrorKind::NotBusy => f.write_str("NOTBUSY"),
            RedisErrorKind::OutOfMemory => f.write_str("OOM"),
            RedisErrorKind::Readonly => f.write_str("READONLY"),
            RedisErrorKind::TryAgain => f.write_str("TRYAGAIN"),
            RedisErrorKind::WrongType => f.write_str("WRONGTYPE"),
            RedisErrorKind::Other(e) => f.write_str(e),
        }
    }
}

/// Error issued by the Redis server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisError {
    pub kind: RedisErrorKind,
    pub description: String,
}

impl From<&str> for RedisError {
    fn from(error: &str) -> Self {
        match error.split_once(' ') {
            Some(("ASK" | "MOVED", _)) => Self {
                kind: error.into(),
                description: "".to_owned(),
            },
            Some((kind, description)) => Self {
                kind: kind.into(),
                description: description.to_owned(),
            },
            None => Self {
                kind: error.into(),
                description: "".to_owned(),
            },
        }
    }
}

impl Display for RedisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            self.kind.fmt(f)
        } else {
            f.write_fmt(format_args!("{} {}", self.kind, self.description))
        }
    }
}
