use crate::{Error, Result, cluster::SLOT_COUNT};
use rand::Rng;
use smallvec::SmallVec;
use std::{
    cmp::Ordering,
    collections::HashSet,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

/// Network address of a cluster member, in `redis://<host>:<port>` form.
///
/// Equality is byte-exact over the URI string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct Endpoint(Arc<str>);

impl Endpoint {
    /// Synthesizes the `redis://<host>:<port>` form used across the slot map.
    pub fn from_host_port(host: &str, port: u16) -> Self {
        Self(Arc::from(format!("redis://{host}:{port}").as_str()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<&str> for Endpoint {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Endpoints serving one contiguous slot range
#[derive(Debug, Clone)]
pub struct SlotRange {
    slot_range: (u16, u16),
    /// endpoints of the shard that owns the slot range,
    /// the first endpoint being the master
    endpoints: SmallVec<[Endpoint; 6]>,
}

impl SlotRange {
    pub fn new(start: u16, end: u16, endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        Self {
            slot_range: (start, end),
            endpoints: endpoints.into_iter().collect(),
        }
    }

    pub fn start(&self) -> u16 {
        self.slot_range.0
    }

    pub fn end(&self) -> u16 {
        self.slot_range.1
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }
}

/// Immutable snapshot of the cluster topology.
///
/// Slots not covered by any range are unassigned; a topology change
/// produces a new `SlotMap`.
#[derive(Debug)]
pub struct SlotMap {
    slot_ranges: Vec<SlotRange>,
}

impl SlotMap {
    pub fn new(mut slot_ranges: Vec<SlotRange>) -> Result<Self> {
        slot_ranges.sort_by_key(|s| s.slot_range.0);

        for (idx, slot_range) in slot_ranges.iter().enumerate() {
            let (start, end) = slot_range.slot_range;
            if start > end || end >= SLOT_COUNT {
                return Err(Error::Config(format!("Invalid slot range {start}-{end}")));
            }
            if slot_range.endpoints.is_empty() {
                return Err(Error::Config(format!(
                    "No endpoints for slot range {start}-{end}"
                )));
            }
            if idx > 0 && slot_ranges[idx - 1].slot_range.1 >= start {
                return Err(Error::Config(format!(
                    "Overlapping slot ranges {}-{} and {start}-{end}",
                    slot_ranges[idx - 1].slot_range.0,
                    slot_ranges[idx - 1].slot_range.1
                )));
            }
        }

        Ok(Self { slot_ranges })
    }

    #[inline]
    fn slot_range_index(&self, slot: u16) -> Option<usize> {
        self.slot_ranges
            .binary_search_by(|s| {
                if s.slot_range.0 > slot {
                    Ordering::Greater
                } else if s.slot_range.1 < slot {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .ok()
    }

    /// Endpoints serving `slot`, master first
    pub fn endpoints_for_slot(&self, slot: u16) -> Option<&[Endpoint]> {
        self.slot_range_index(slot)
            .map(|idx| self.slot_ranges[idx].endpoints.as_slice())
    }

    /// Alias of [`endpoints_for_slot`](SlotMap::endpoints_for_slot) for
    /// call sites that already hashed a key into `slot`
    #[inline]
    pub fn endpoints_for_key(&self, slot: u16) -> Option<&[Endpoint]> {
        self.endpoints_for_slot(slot)
    }

    /// Set union of the endpoints over all slot ranges
    pub fn endpoints(&self) -> HashSet<Endpoint> {
        self.slot_ranges
            .iter()
            .flat_map(|s| s.endpoints.iter().cloned())
            .collect()
    }

    /// Uniform pick of a slot grouping, then of one of its members
    pub fn random_endpoint(&self) -> Option<&Endpoint> {
        if self.slot_ranges.is_empty() {
            return None;
        }

        let slot_range = &self.slot_ranges[rand::rng().random_range(0..self.slot_ranges.len())];
        Some(&slot_range.endpoints[rand::rng().random_range(0..slot_range.endpoints.len())])
    }

    /// Number of distinct slot groupings
    pub fn size(&self) -> usize {
        self.slot_ranges.len()
    }

    /// Endpoints of the `index`-th slot grouping, master first
    pub fn endpoints_for_group(&self, index: usize) -> Option<&[Endpoint]> {
        self.slot_ranges
            .get(index)
            .map(|s| s.endpoints.as_slice())
    }
}
