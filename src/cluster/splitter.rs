use crate::{
    cluster::{CommandInfo, hash_slot},
    resp::Request,
};
use std::collections::BTreeMap;

/// Resolved key positions over the argument list of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KeyRange {
    pub start: usize,
    /// exclusive
    pub end: usize,
    pub step: usize,
}

/// Resolves the key-arity metadata of a command against a concrete
/// argument count.
///
/// A positive `last_key` is a 1-based inclusive position counting the
/// command name, so over the name-less argument slice it is already
/// the exclusive end.
pub(crate) fn resolve_key_range(info: &CommandInfo, num_args: usize) -> KeyRange {
    let start = (info.first_key as i32 - 1).max(0) as usize;
    let end = if info.last_key >= 0 {
        (info.last_key as i32).max(0) as usize
    } else {
        (num_args as i32 + info.last_key as i32 + 1).max(0) as usize
    };

    KeyRange {
        start,
        end: end.min(num_args),
        step: info.key_step.max(1),
    }
}

/// Key positions of a resolved range
pub(crate) fn key_positions(range: &KeyRange) -> impl Iterator<Item = usize> {
    (range.start..range.end).step_by(range.step)
}

/// Partitions a multi-key request into one sub-request per slot.
///
/// Pre-key arguments are prepended to every sub-request, each key keeps
/// its `step - 1` trailing companions, and the arguments past the key
/// section are appended to every sub-request as a shared tail.
pub(crate) fn split_by_slot(request: &Request, range: &KeyRange) -> BTreeMap<u16, Request> {
    let args = request.args();
    let mut sub_requests = BTreeMap::<u16, Request>::new();

    for position in key_positions(range) {
        let slot = hash_slot(&args[position]);
        let sub_request = sub_requests.entry(slot).or_insert_with(|| Request {
            name: request.name.clone(),
            args: args[..range.start].iter().cloned().collect(),
        });

        for arg in &args[position..(position + range.step).min(args.len())] {
            sub_request.args.push(arg.clone());
        }
    }

    let tail = &args[range.end.min(args.len())..];
    if !tail.is_empty() {
        for sub_request in sub_requests.values_mut() {
            sub_request.args.extend(tail.iter().cloned());
        }
    }

    sub_requests
}
