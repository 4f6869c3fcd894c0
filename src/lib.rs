/*!
routis is the cluster-aware routing core of a Redis client.

Given an application-issued command or pipelined batch, it determines
which node of a sharded Redis deployment must receive it, dispatches it
over a pooled connection, interprets sharding-related redirections, and
fans multi-key commands out across shards when their keys span slots.

# Features
* [Hash-slot](https://redis.io/docs/reference/cluster-spec/#key-distribution-model)
  key placement with hash-tag support
* Per-command routing metadata (keyless / single-key / multi-key /
  movable / read-only)
* `MOVED`/`ASK`/`TRYAGAIN`/`CLUSTERDOWN` handling with a bounded retry
  budget and exponential backoff
* Scatter/gather dispatch with pluggable per-command reply reducers
* Read-preference selection between masters and replicas
* Same-slot pipelined batches

The single-node connection itself (socket lifecycle, RESP framing,
pipelining) is a collaborator provided by the caller through the
[`NodeConnection`](cluster::NodeConnection) trait; the router owns a
table of such connections and never creates them. Likewise the cluster
topology is handed over as a populated
[`SlotMap`](cluster::SlotMap) snapshot: when the cluster reshards, a
`MOVED` redirection is surfaced to the caller, who is expected to
rebuild the router from a fresh snapshot.

# Routing a request

Requests are built with the [`cmd`](resp::cmd) shortcut and routed
through [`ClusterRouter::send`](cluster::ClusterRouter::send), which
resolves with the reply or the first unrecoverable error:
* single-key commands go to the node serving the key's slot;
* multi-key commands whose keys share one slot go out as a single
  request;
* multi-key and keyless commands with a registered reducer are split
  and scattered, and their partial replies reduced into one;
* everything a cluster client cannot route (administrative,
  connection-scoped, transactional, pub/sub-state commands, and
  commands with movable keys) is rejected before any I/O.
*/

pub mod cluster;
mod error;
pub mod resp;

pub use error::*;

/// Library general result type.
pub type Result<T> = std::result::Result<T, Error>;
/// Library general future type.
pub type Future<'a, T> = futures_util::future::BoxFuture<'a, Result<T>>;

#[cfg(test)]
mod tests;
