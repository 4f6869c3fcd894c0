use crate::cluster::{Endpoint, ReadPreference, RouterConfig, SlotMap};
use rand::Rng;

/// Picks one endpoint of a master-first list according to the read preference.
///
/// Writes always go to the master. A single-entry list falls back to
/// the master whatever the preference.
pub(crate) fn select_master_or_replica<'a>(
    read_only: bool,
    preference: ReadPreference,
    endpoints: &'a [Endpoint],
) -> &'a Endpoint {
    if read_only && preference != ReadPreference::MasterOnly && endpoints.len() >= 2 {
        let index = match preference {
            ReadPreference::ReplicaOnly => rand::rng().random_range(1..endpoints.len()),
            _ => rand::rng().random_range(0..endpoints.len()),
        };
        &endpoints[index]
    } else {
        &endpoints[0]
    }
}

/// Resolves the target endpoint of a slot, or of "any" slot when `slot`
/// is `None`.
///
/// A slot the map does not cover falls back to the configured default
/// endpoint, typically the bootstrap address. The fallback is not
/// guaranteed to be connected; dispatch reports a missing connection
/// separately.
pub(crate) fn select_endpoint<'a>(
    slot_map: &'a SlotMap,
    config: &'a RouterConfig,
    slot: Option<u16>,
    read_only: bool,
) -> Option<&'a Endpoint> {
    match slot {
        None => slot_map.random_endpoint(),
        Some(slot) => match slot_map.endpoints_for_slot(slot) {
            Some(endpoints) if !endpoints.is_empty() => Some(select_master_or_replica(
                read_only,
                config.read_preference,
                endpoints,
            )),
            _ => config.default_endpoint.as_ref(),
        },
    }
}
