use crate::{
    Error, Future,
    cluster::Endpoint,
    resp::{Request, Response},
};
use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Caller-supplied observer of out-of-band replies
pub type ReplyHandler = Arc<dyn Fn(&Response) + Send + Sync>;
/// Caller-supplied observer of connection failures
pub type ExceptionHandler = Arc<dyn Fn(&Error) + Send + Sync>;
/// Caller-supplied observer of connection termination
pub type EndHandler = Arc<dyn Fn() + Send + Sync>;

/// Contract of one multiplexed connection to a single cluster node.
///
/// Implementations serialize all operations onto the connection's own
/// execution context and deliver replies in send order (the connection
/// is a pipelined FIFO). Dropping a reply future must leave the
/// pending queue coherent: the late reply is discarded on arrival.
///
/// Error replies from the server surface as [`Response::Error`]
/// carrying the raw error line parsed into a
/// [`RedisError`](crate::RedisError), so that the router can interpret
/// its whitespace-delimited tokens.
pub trait NodeConnection: Send + Sync {
    /// Enqueues one command and resolves with its reply.
    fn send(&self, request: Request) -> Future<'_, Response>;

    /// Enqueues the requests back to back and resolves with their
    /// replies, in request order.
    fn send_batch(&self, requests: Vec<Request>) -> Future<'_, Vec<Response>>;

    /// Stops delivering replies until resumed.
    fn pause(&self);

    /// Resumes reply delivery.
    fn resume(&self);

    /// Allows `demand` more replies to be delivered while paused.
    fn fetch(&self, demand: usize);

    fn set_reply_handler(&self, handler: Option<ReplyHandler>);

    fn set_exception_handler(&self, handler: Option<ExceptionHandler>);

    fn set_end_handler(&self, handler: Option<EndHandler>);

    /// Whether the pending-reply queue reached its limit
    fn pending_queue_full(&self) -> bool;

    /// Closes the underlying connection; in-flight requests complete
    /// or fail, further sends fail.
    fn close(&self) -> Future<'_, ()>;
}

/// Connections to the cluster members, keyed by endpoint.
///
/// Populated at cluster-connect time by the caller; the router borrows
/// connections from the table and never creates them. An endpoint
/// surfaced by a redirection but absent from the table is a routing
/// error.
#[derive(Default)]
pub struct ConnectionTable {
    connections: HashMap<Endpoint, Arc<dyn NodeConnection>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, endpoint: Endpoint, connection: Arc<dyn NodeConnection>) {
        self.connections.insert(endpoint, connection);
    }

    pub fn get(&self, endpoint: &Endpoint) -> Option<&Arc<dyn NodeConnection>> {
        self.connections.get(endpoint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Endpoint, &Arc<dyn NodeConnection>)> {
        self.connections.iter()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl FromIterator<(Endpoint, Arc<dyn NodeConnection>)> for ConnectionTable {
    fn from_iter<T: IntoIterator<Item = (Endpoint, Arc<dyn NodeConnection>)>>(iter: T) -> Self {
        Self {
            connections: iter.into_iter().collect(),
        }
    }
}

impl Debug for ConnectionTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.connections.keys()).finish()
    }
}
