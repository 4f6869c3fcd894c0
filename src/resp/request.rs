use bytes::Bytes;
use smallvec::SmallVec;
use std::fmt::{self, Write};

/// Shortcut function for creating a request.
#[must_use]
#[inline(always)]
pub fn cmd(name: &'static str) -> Request {
    Request::new(name)
}

/// Generic command meant to be routed to a Redis cluster node.
///
/// Arguments are raw byte-strings; the connection layer owns their
/// serialization to the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub(crate) name: Bytes,
    pub(crate) args: SmallVec<[Bytes; 10]>,
}

impl Request {
    /// Creates a new request.
    ///
    /// [`cmd`](crate::resp::cmd) function can be used as a shortcut.
    #[must_use]
    #[inline(always)]
    pub fn new(name: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            args: SmallVec::new(),
        }
    }

    /// Builder function to add an argument to an existing request.
    #[must_use]
    #[inline(always)]
    pub fn arg(mut self, arg: impl Into<Bytes>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Command name normalized to uppercase, as the routing registries key it.
    pub fn name_uppercase(&self) -> String {
        String::from_utf8_lossy(&self.name).to_ascii_uppercase()
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn num_args(&self) -> usize {
        self.args.len()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        String::from_utf8_lossy(&self.name).fmt(f)?;
        for arg in &self.args {
            f.write_char(' ')?;
            String::from_utf8_lossy(arg).fmt(f)?;
        }

        Ok(())
    }
}
