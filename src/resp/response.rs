use crate::{Error, RedisError, Result};
use bytes::Bytes;

/// Payload of a bulk string reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkString {
    Binary(Bytes),
    Nil,
}

/// Reply to a routed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    SimpleString(String),
    Integer(i64),
    BulkString(BulkString),
    Array(Vec<Response>),
    Error(RedisError),
}

impl Response {
    /// The `+OK` simple string reply
    #[inline]
    pub fn ok() -> Self {
        Response::SimpleString("OK".to_owned())
    }

    /// The nil bulk string reply
    #[inline]
    pub fn nil() -> Self {
        Response::BulkString(BulkString::Nil)
    }

    /// A bulk string reply over `bytes`
    #[inline]
    pub fn bulk(bytes: impl Into<Bytes>) -> Self {
        Response::BulkString(BulkString::Binary(bytes.into()))
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}

impl Default for Response {
    fn default() -> Self {
        Response::nil()
    }
}

pub(crate) trait ResponseResultExt {
    fn into_result(self) -> Result<Response>;
}

impl ResponseResultExt for Result<Response> {
    #[inline]
    fn into_result(self) -> Result<Response> {
        match self {
            Ok(Response::Error(e)) => Err(Error::Redis(e)),
            _ => self,
        }
    }
}
