use crate::{
    Error, Future, RedisErrorKind, Result,
    cluster::{
        CommandInfo, ConnectionTable, EndHandler, Endpoint, ExceptionHandler, ReducerRegistry,
        ReplyHandler, RouterConfig, SlotMap, hash_slot,
    },
    resp::{Request, Response, ResponseResultExt, cmd},
};
use futures_util::future;
use log::{debug, trace, warn};
use smallvec::SmallVec;
use std::{
    collections::{BTreeMap, HashMap},
    iter::zip,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use super::{
    command_info::{UNSUPPORTED_COMMANDS, default_unsupported_reason, find_command_info},
    selector::{select_endpoint, select_master_or_replica},
    splitter::{key_positions, resolve_key_range, split_by_slot},
};

/// Builder of a [`ClusterRouter`].
///
/// Captures the reducer and unsupported-command registries before the
/// router starts serving, so steady-state reads need no
/// synchronization.
pub struct ClusterRouterBuilder {
    slot_map: SlotMap,
    connections: ConnectionTable,
    config: RouterConfig,
    reducers: ReducerRegistry,
    unsupported: HashMap<String, String>,
}

impl ClusterRouterBuilder {
    pub fn new(slot_map: SlotMap, connections: ConnectionTable) -> Self {
        let unsupported = UNSUPPORTED_COMMANDS
            .iter()
            .map(|name| ((*name).to_owned(), default_unsupported_reason(name)))
            .collect();

        Self {
            slot_map,
            connections,
            config: Default::default(),
            reducers: ReducerRegistry::with_builtins(),
            unsupported,
        }
    }

    #[must_use]
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a reply reducer for the command `name`, replacing any
    /// built-in one.
    #[must_use]
    pub fn reducer<F>(mut self, name: impl Into<String>, reducer: F) -> Self
    where
        F: Fn(Vec<Response>) -> Result<Response> + Send + Sync + 'static,
    {
        self.reducers.register(name, reducer);
        self
    }

    /// Marks the command `name` as unsupported with an explicit `reason`.
    #[must_use]
    pub fn unsupported_command(
        mut self,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let mut name = name.into();
        name.make_ascii_uppercase();
        self.unsupported.insert(name, reason.into());
        self
    }

    pub fn build(self) -> ClusterRouter {
        let tag = if self.config.connection_name.is_empty() {
            "cluster".to_owned()
        } else {
            self.config.connection_name.clone()
        };

        debug!(
            "[{tag}] Cluster router created: slot_map={:?}, connections={:?}",
            self.slot_map, self.connections
        );

        ClusterRouter {
            slot_map: self.slot_map,
            connections: self.connections,
            config: self.config,
            reducers: self.reducers,
            unsupported: self.unsupported,
            closed: AtomicBool::new(false),
            tag,
        }
    }
}

/// Routing engine over the connections of a Redis cluster.
///
/// Classifies each request from its command metadata, picks the target
/// node from the slot of its keys, recovers transient cluster errors
/// (`ASK`, `TRYAGAIN`, `CLUSTERDOWN`) within a bounded retry budget,
/// and scatter/gathers multi-key commands whose keys span slots.
///
/// The router owns its [`ConnectionTable`] and closes every connection
/// on [`close`](ClusterRouter::close); it never mutates the
/// [`SlotMap`]: a `MOVED` redirection is surfaced to the caller, who is
/// expected to rebuild the router from a fresh topology snapshot.
pub struct ClusterRouter {
    slot_map: SlotMap,
    connections: ConnectionTable,
    config: RouterConfig,
    reducers: ReducerRegistry,
    unsupported: HashMap<String, String>,
    closed: AtomicBool,
    tag: String,
}

impl ClusterRouter {
    /// Starts a builder from a populated topology snapshot and
    /// connection table.
    pub fn builder(slot_map: SlotMap, connections: ConnectionTable) -> ClusterRouterBuilder {
        ClusterRouterBuilder::new(slot_map, connections)
    }

    /// Routes one request and resolves with its reply.
    pub async fn send(&self, request: Request) -> Result<Response> {
        trace!("[{}] Analyzing request {request}", self.tag);

        let name = request.name_uppercase();
        let info = self.check_command(&name)?;
        let read_only = info.is_read_only();

        if info.is_keyless() {
            if self.reducers.contains(&name) {
                return self.scatter_keyless(&name, read_only, request).await;
            }

            // keyless commands without a reducer go to any node,
            // replicas included whatever the read preference
            let endpoint = select_endpoint(&self.slot_map, &self.config, None, read_only)
                .ok_or_else(|| Error::Client(format!("[{}] No endpoint available", self.tag)))?
                .clone();
            return self.dispatch(endpoint, self.config.max_retries, request).await;
        }

        let range = resolve_key_range(info, request.num_args());

        if info.is_multi_key() {
            let mut first_slot: Option<u16> = None;
            let mut mixed = false;
            for position in key_positions(&range) {
                let slot = hash_slot(&request.args()[position]);
                match first_slot {
                    None => first_slot = Some(slot),
                    Some(first) if first != slot => {
                        mixed = true;
                        break;
                    }
                    _ => (),
                }
            }

            let Some(first_slot) = first_slot else {
                return Err(Error::Client(format!(
                    "[{}] Missing key arguments in {request}",
                    self.tag
                )));
            };

            if !mixed {
                let endpoint = self.slot_endpoint(first_slot, read_only)?.clone();
                return self.dispatch(endpoint, self.config.max_retries, request).await;
            }

            if !self.reducers.contains(&name) {
                return Err(Error::Client(format!(
                    "[{}] No reducer available for {name}",
                    self.tag
                )));
            }

            let sub_requests = split_by_slot(&request, &range);
            debug!(
                "[{}] Splitting {name} across {} slots",
                self.tag,
                sub_requests.len()
            );
            return self.scatter_slots(&name, read_only, sub_requests).await;
        }

        let Some(key) = request.args().get(range.start) else {
            return Err(Error::Client(format!(
                "[{}] Missing key argument in {request}",
                self.tag
            )));
        };
        let endpoint = self.slot_endpoint(hash_slot(key), read_only)?.clone();
        self.dispatch(endpoint, self.config.max_retries, request).await
    }

    /// Routes a pipelined batch; every request must resolve to the same
    /// endpoint, otherwise the batch fails before any I/O.
    pub async fn batch(&self, requests: Vec<Request>) -> Result<Vec<Response>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let mut read_only = false;
        let mut batch_slot: Option<u16> = None;

        for request in &requests {
            let name = request.name_uppercase();
            let info = self.check_command(&name)?;
            read_only |= info.is_read_only();

            if info.is_keyless() {
                continue;
            }

            let range = resolve_key_range(info, request.num_args());
            let mut request_slot: Option<u16> = None;

            if info.is_multi_key() {
                for position in key_positions(&range) {
                    let slot = hash_slot(&request.args()[position]);
                    match request_slot {
                        None => request_slot = Some(slot),
                        Some(first) if first != slot => {
                            return Err(Error::Client(format!(
                                "[{}] Cannot batch {name} with mismatched key slots",
                                self.tag
                            )));
                        }
                        _ => (),
                    }
                }
            } else {
                let Some(key) = request.args().get(range.start) else {
                    return Err(Error::Client(format!(
                        "[{}] Missing key argument in {request}",
                        self.tag
                    )));
                };
                request_slot = Some(hash_slot(key));
            }

            match (batch_slot, request_slot) {
                (None, slot) => batch_slot = slot,
                (Some(batch), Some(slot)) if batch != slot => {
                    return Err(Error::Client(format!(
                        "[{}] Cannot batch requests with mismatched key slots: \
                         cross-slot batching is not supported",
                        self.tag
                    )));
                }
                _ => (),
            }
        }

        let endpoint = match batch_slot {
            Some(slot) => self.slot_endpoint(slot, read_only)?.clone(),
            None => select_endpoint(&self.slot_map, &self.config, None, read_only)
                .ok_or_else(|| Error::Client(format!("[{}] No endpoint available", self.tag)))?
                .clone(),
        };

        self.dispatch_batch(endpoint, self.config.max_retries, requests)
            .await
    }

    /// Rejects unsupported, unknown, and movable-keys commands.
    fn check_command(&self, name: &str) -> Result<&'static CommandInfo> {
        if let Some(reason) = self.unsupported.get(name) {
            return Err(Error::Client(reason.clone()));
        }

        let Some(info) = find_command_info(name.as_bytes()) else {
            return Err(Error::Client(format!("Unknown command {name}")));
        };

        if info.is_movable() {
            return Err(Error::Client(format!(
                "[{}] {name}: movable-keys commands are not supported in cluster mode",
                self.tag
            )));
        }

        Ok(info)
    }

    fn slot_endpoint(&self, slot: u16, read_only: bool) -> Result<&Endpoint> {
        select_endpoint(&self.slot_map, &self.config, Some(slot), read_only).ok_or_else(|| {
            Error::Client(format!(
                "[{}] No endpoint configured for slot {slot}",
                self.tag
            ))
        })
    }

    /// Sends `request` to `endpoint` and post-processes the reply.
    ///
    /// `MOVED` is surfaced unchanged; `ASK` is recovered in-band with
    /// `ASKING` on the current connection followed by a re-dispatch to
    /// the redirection target; `TRYAGAIN` and `CLUSTERDOWN` are retried
    /// after a backoff. Each recovery consumes one unit of the retry
    /// budget; an exhausted budget surfaces the error as-is.
    fn dispatch(&self, endpoint: Endpoint, retries: u32, request: Request) -> Future<'_, Response> {
        Box::pin(async move {
            let Some(connection) = self.connections.get(&endpoint) else {
                return Err(Error::Client(format!(
                    "[{}] Missing connection to {endpoint}",
                    self.tag
                )));
            };

            let error = match connection.send(request.clone()).await? {
                Response::Error(error) => error,
                response => return Ok(response),
            };

            match &error.kind {
                RedisErrorKind::Moved { hash_slot, .. } => {
                    debug!(
                        "[{}] Slot {hash_slot} moved, surfacing to the caller",
                        self.tag
                    );
                    Err(Error::Redis(error))
                }
                RedisErrorKind::Ask {
                    hash_slot,
                    address: (host, port),
                } if retries > 0 => {
                    let redirected = Endpoint::from_host_port(host, *port);
                    debug!(
                        "[{}] Slot {hash_slot} is migrating, asking {redirected} ({} retries left)",
                        self.tag,
                        retries - 1
                    );
                    connection.send(cmd("ASKING")).await.into_result()?;
                    self.dispatch(redirected, retries - 1, request).await
                }
                RedisErrorKind::TryAgain | RedisErrorKind::ClusterDown if retries > 0 => {
                    let delay = retry_delay(retries);
                    debug!(
                        "[{}] {} received from {endpoint}, retrying in {delay:?} ({} retries left)",
                        self.tag,
                        error.kind,
                        retries - 1
                    );
                    tokio::time::sleep(delay).await;
                    self.dispatch(endpoint, retries - 1, request).await
                }
                _ => Err(Error::Redis(error)),
            }
        })
    }

    /// Sends the batch to `endpoint`; the recovery actions of
    /// [`dispatch`](ClusterRouter::dispatch) apply to the whole batch.
    /// Non-cluster error replies stay in the reply list.
    fn dispatch_batch(
        &self,
        endpoint: Endpoint,
        retries: u32,
        requests: Vec<Request>,
    ) -> Future<'_, Vec<Response>> {
        Box::pin(async move {
            let Some(connection) = self.connections.get(&endpoint) else {
                return Err(Error::Client(format!(
                    "[{}] Missing connection to {endpoint}",
                    self.tag
                )));
            };

            let replies = connection.send_batch(requests.clone()).await?;

            for reply in &replies {
                let Response::Error(error) = reply else {
                    continue;
                };

                match &error.kind {
                    RedisErrorKind::Moved { hash_slot, .. } => {
                        debug!(
                            "[{}] Slot {hash_slot} moved, surfacing to the caller",
                            self.tag
                        );
                        return Err(Error::Redis(error.clone()));
                    }
                    RedisErrorKind::Ask {
                        hash_slot,
                        address: (host, port),
                    } if retries > 0 => {
                        let redirected = Endpoint::from_host_port(host, *port);
                        debug!(
                            "[{}] Slot {hash_slot} is migrating, asking {redirected} \
                             for the whole batch ({} retries left)",
                            self.tag,
                            retries - 1
                        );
                        connection.send(cmd("ASKING")).await.into_result()?;
                        return self.dispatch_batch(redirected, retries - 1, requests).await;
                    }
                    RedisErrorKind::TryAgain | RedisErrorKind::ClusterDown if retries > 0 => {
                        let delay = retry_delay(retries);
                        debug!(
                            "[{}] {} received from {endpoint}, retrying the batch in {delay:?} \
                             ({} retries left)",
                            self.tag,
                            error.kind,
                            retries - 1
                        );
                        tokio::time::sleep(delay).await;
                        return self.dispatch_batch(endpoint, retries - 1, requests).await;
                    }
                    _ => (),
                }
            }

            Ok(replies)
        })
    }

    /// Fans a keyless command out to every slot grouping and reduces
    /// the partial replies.
    async fn scatter_keyless(
        &self,
        name: &str,
        read_only: bool,
        request: Request,
    ) -> Result<Response> {
        let mut dispatches = Vec::with_capacity(self.slot_map.size());
        for index in 0..self.slot_map.size() {
            let Some(endpoints) = self.slot_map.endpoints_for_group(index) else {
                continue;
            };
            let endpoint =
                select_master_or_replica(read_only, self.config.read_preference, endpoints)
                    .clone();
            dispatches.push(self.dispatch(endpoint, self.config.max_retries, request.clone()));
        }

        debug!(
            "[{}] Fanning {name} out to {} slot groupings",
            self.tag,
            dispatches.len()
        );

        let partials = future::try_join_all(dispatches).await?;
        self.reduce(name, partials)
    }

    /// Dispatches per-slot sub-requests in parallel, each with its own
    /// full retry budget, and reduces the partial replies in issue
    /// order. The first failure wins; late replies are discarded by the
    /// connection layer.
    async fn scatter_slots(
        &self,
        name: &str,
        read_only: bool,
        sub_requests: BTreeMap<u16, Request>,
    ) -> Result<Response> {
        let mut dispatches = Vec::with_capacity(sub_requests.len());
        for (slot, sub_request) in sub_requests {
            let endpoint = self.slot_endpoint(slot, read_only)?.clone();
            dispatches.push(self.dispatch(endpoint, self.config.max_retries, sub_request));
        }

        let partials = future::try_join_all(dispatches).await?;
        self.reduce(name, partials)
    }

    fn reduce(&self, name: &str, partials: Vec<Response>) -> Result<Response> {
        let Some(reducer) = self.reducers.get(name) else {
            return Err(Error::Client(format!(
                "[{}] No reducer available for {name}",
                self.tag
            )));
        };

        reducer(partials)
    }

    /// Suspends reply delivery on every connection.
    pub fn pause_reads(&self) {
        for (_, connection) in self.connections.iter() {
            connection.pause();
        }
    }

    /// Resumes reply delivery on every connection.
    pub fn resume_reads(&self) {
        for (_, connection) in self.connections.iter() {
            connection.resume();
        }
    }

    /// Grants `demand` more replies to every connection.
    pub fn set_demand(&self, demand: usize) {
        for (_, connection) in self.connections.iter() {
            connection.fetch(demand);
        }
    }

    pub fn set_reply_handler(&self, handler: Option<ReplyHandler>) {
        for (_, connection) in self.connections.iter() {
            connection.set_reply_handler(handler.clone());
        }
    }

    pub fn set_exception_handler(&self, handler: Option<ExceptionHandler>) {
        for (_, connection) in self.connections.iter() {
            connection.set_exception_handler(handler.clone());
        }
    }

    pub fn set_end_handler(&self, handler: Option<EndHandler>) {
        for (_, connection) in self.connections.iter() {
            connection.set_end_handler(handler.clone());
        }
    }

    /// Whether any connection reports a full pending-reply queue
    pub fn pending_queue_full(&self) -> bool {
        self.connections
            .iter()
            .any(|(_, connection)| connection.pending_queue_full())
    }

    /// Closes every connection of the table, at most once.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut endpoints = SmallVec::<[_; 16]>::new();
        let mut close_futures = SmallVec::<[_; 16]>::new();
        for (endpoint, connection) in self.connections.iter() {
            endpoints.push(endpoint);
            close_futures.push(connection.close());
        }

        for (endpoint, result) in zip(endpoints, future::join_all(close_futures).await) {
            if let Err(e) = result {
                warn!("[{}] Cannot close connection to {endpoint}: {e}", self.tag);
            }
        }

        debug!("[{}] Cluster router closed", self.tag);
    }
}

/// Backoff before retrying a transient cluster error.
///
/// Doubles as the budget shrinks, capped at 1280 ms once fewer than
/// 9 retries remain.
fn retry_delay(retries: u32) -> Duration {
    Duration::from_millis((1u64 << (16 - retries.clamp(9, 16))) * 10)
}

#[cfg(test)]
mod tests {
    use super::retry_delay;
    use std::time::Duration;

    #[test]
    fn backoff_doubles_then_clamps() {
        assert_eq!(Duration::from_millis(10), retry_delay(16));
        assert_eq!(Duration::from_millis(20), retry_delay(15));
        assert_eq!(Duration::from_millis(640), retry_delay(10));
        assert_eq!(Duration::from_millis(1280), retry_delay(9));
        assert_eq!(Duration::from_millis(1280), retry_delay(3));
        assert_eq!(Duration::from_millis(1280), retry_delay(0));
    }
}
