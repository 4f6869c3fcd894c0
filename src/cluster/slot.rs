use memchr::memchr;

/// Total number of hash slots of a cluster keyspace
pub const SLOT_COUNT: u16 = 16384;

/// Maps a key to its hash slot.
///
/// When the key carries a hash tag, only the tag is hashed, so that
/// related keys can be forced into the same slot.
/// see <https://redis.io/docs/reference/cluster-spec/#hash-tags>
pub fn hash_slot(key: &[u8]) -> u16 {
    crc16(hash_tag(key)) % SLOT_COUNT
}

/// Returns the bytes between the first `{` and the next `}` when that
/// substring is non empty, the whole key otherwise
fn hash_tag(key: &[u8]) -> &[u8] {
    if let Some(open) = memchr(b'{', key)
        && let Some(len) = memchr(b'}', &key[open + 1..])
        && len != 0
    {
        &key[open + 1..open + 1 + len]
    } else {
        key
    }
}

fn crc16(key: &[u8]) -> u16 {
    crc16::State::<crc16::XMODEM>::calculate(key)
}
