use smallvec::SmallVec;

const KEYLESS: u8 = 0x01;
const READ_ONLY: u8 = 0x02;
const MULTI_KEY: u8 = 0x04;
const MOVABLE: u8 = 0x08;

/// Routing metadata of a Redis command.
///
/// `first_key` and `last_key` follow the `COMMAND` reply convention:
/// 1-based positions over the full argv counting the command name as
/// element zero; `first_key == 0` means the command takes no key;
/// a negative `last_key` counts from the end (`-1` = last argument).
/// `key_step` is the distance between consecutive keys.
#[derive(Debug)]
pub struct CommandInfo {
    pub name: &'static str,
    pub first_key: i16,
    pub last_key: i16,
    pub key_step: usize,
    flags: u8,
}

impl CommandInfo {
    const fn new(name: &'static str, first_key: i16, last_key: i16, key_step: usize, flags: u8) -> Self {
        Self {
            name,
            first_key,
            last_key,
            key_step,
            flags,
        }
    }

    /// The command takes no key argument
    #[inline]
    pub fn is_keyless(&self) -> bool {
        self.flags & KEYLESS != 0
    }

    /// The command never writes; it may be served by a replica
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags & READ_ONLY != 0
    }

    /// The command accepts several keys that may hash to different slots
    #[inline]
    pub fn is_multi_key(&self) -> bool {
        self.flags & MULTI_KEY != 0
    }

    /// The key positions depend on server-side evaluation of the arguments
    #[inline]
    pub fn is_movable(&self) -> bool {
        self.flags & MOVABLE != 0
    }
}

/// Finds the routing metadata of a command by its name, ASCII-case-insensitively.
pub fn find_command_info(name: &[u8]) -> Option<&'static CommandInfo> {
    let mut upper = SmallVec::<[u8; 20]>::from_slice(name);
    upper.make_ascii_uppercase();
    COMMAND_INFOS
        .binary_search_by(|info| info.name.as_bytes().cmp(upper.as_slice()))
        .ok()
        .map(|idx| &COMMAND_INFOS[idx])
}

/// Commands a cluster client cannot route: administrative,
/// connection-scoped, transactional, pub/sub-state, and cursor-based
/// commands, plus the cluster-wide flush.
pub(crate) const UNSUPPORTED_COMMANDS: &[&str] = &[
    "ASKING",
    "AUTH",
    "BGREWRITEAOF",
    "BGSAVE",
    "CLIENT",
    "CLUSTER",
    "COMMAND",
    "CONFIG",
    "DEBUG",
    "DISCARD",
    "EXEC",
    "FLUSHALL",
    "HOST",
    "INFO",
    "LASTSAVE",
    "LATENCY",
    "MEMORY",
    "MODULE",
    "MONITOR",
    "MULTI",
    "PING",
    "PSUBSCRIBE",
    "PSYNC",
    "PUNSUBSCRIBE",
    "READONLY",
    "READWRITE",
    "REPLICAOF",
    "RESET",
    "ROLE",
    "SAVE",
    "SCAN",
    "SCRIPT",
    "SELECT",
    "SENTINEL",
    "SHUTDOWN",
    "SLAVEOF",
    "SLOWLOG",
    "SSUBSCRIBE",
    "SUBSCRIBE",
    "SUNSUBSCRIBE",
    "SWAPDB",
    "SYNC",
    "UNSUBSCRIBE",
    "UNWATCH",
    "WAIT",
    "WATCH",
];

/// Default rejection reason of an unsupported command
pub(crate) fn default_unsupported_reason(name: &str) -> String {
    if name == "FLUSHALL" {
        "FLUSHALL is not supported in cluster mode, use FLUSHDB instead".to_owned()
    } else {
        format!("{name} is not supported in cluster mode")
    }
}

/// Key-arity metadata per known command, matching the `COMMAND` reply
/// of the server. Sorted by name for binary search.
pub(crate) static COMMAND_INFOS: &[CommandInfo] = &[
    CommandInfo::new("APPEND", 1, 1, 1, 0),
    CommandInfo::new("BITCOUNT", 1, 1, 1, READ_ONLY),
    CommandInfo::new("BITOP", 2, -1, 1, MULTI_KEY),
    CommandInfo::new("BITPOS", 1, 1, 1, READ_ONLY),
    CommandInfo::new("COPY", 1, 2, 1, MULTI_KEY),
    CommandInfo::new("DBSIZE", 0, 0, 1, KEYLESS | READ_ONLY),
    CommandInfo::new("DECR", 1, 1, 1, 0),
    CommandInfo::new("DECRBY", 1, 1, 1, 0),
    CommandInfo::new("DEL", 1, -1, 1, MULTI_KEY),
    CommandInfo::new("DUMP", 1, 1, 1, READ_ONLY),
    CommandInfo::new("EVAL", 0, 0, 1, MOVABLE),
    CommandInfo::new("EVALSHA", 0, 0, 1, MOVABLE),
    CommandInfo::new("EXISTS", 1, -1, 1, MULTI_KEY | READ_ONLY),
    CommandInfo::new("EXPIRE", 1, 1, 1, 0),
    CommandInfo::new("EXPIREAT", 1, 1, 1, 0),
    CommandInfo::new("EXPIRETIME", 1, 1, 1, READ_ONLY),
    CommandInfo::new("FCALL", 0, 0, 1, MOVABLE),
    CommandInfo::new("FCALL_RO", 0, 0, 1, MOVABLE | READ_ONLY),
    CommandInfo::new("FLUSHDB", 0, 0, 1, KEYLESS),
    CommandInfo::new("GEOADD", 1, 1, 1, 0),
    CommandInfo::new("GEODIST", 1, 1, 1, READ_ONLY),
    CommandInfo::new("GEOPOS", 1, 1, 1, READ_ONLY),
    CommandInfo::new("GEORADIUS", 1, 1, 1, MOVABLE),
    CommandInfo::new("GEORADIUSBYMEMBER", 1, 1, 1, MOVABLE),
    CommandInfo::new("GEOSEARCH", 1, 1, 1, READ_ONLY),
    CommandInfo::new("GEOSEARCHSTORE", 1, 2, 1, MULTI_KEY),
    CommandInfo::new("GET", 1, 1, 1, READ_ONLY),
    CommandInfo::new("GETBIT", 1, 1, 1, READ_ONLY),
    CommandInfo::new("GETDEL", 1, 1, 1, 0),
    CommandInfo::new("GETEX", 1, 1, 1, 0),
    CommandInfo::new("GETRANGE", 1, 1, 1, READ_ONLY),
    CommandInfo::new("GETSET", 1, 1, 1, 0),
    CommandInfo::new("HDEL", 1, 1, 1, 0),
    CommandInfo::new("HEXISTS", 1, 1, 1, READ_ONLY),
    CommandInfo::new("HGET", 1, 1, 1, READ_ONLY),
    CommandInfo::new("HGETALL", 1, 1, 1, READ_ONLY),
    CommandInfo::new("HINCRBY", 1, 1, 1, 0),
    CommandInfo::new("HINCRBYFLOAT", 1, 1, 1, 0),
    CommandInfo::new("HKEYS", 1, 1, 1, READ_ONLY),
    CommandInfo::new("HLEN", 1, 1, 1, READ_ONLY),
    CommandInfo::new("HMGET", 1, 1, 1, READ_ONLY),
    CommandInfo::new("HMSET", 1, 1, 1, 0),
    CommandInfo::new("HRANDFIELD", 1, 1, 1, READ_ONLY),
    CommandInfo::new("HSCAN", 1, 1, 1, READ_ONLY),
    CommandInfo::new("HSET", 1, 1, 1, 0),
    CommandInfo::new("HSETNX", 1, 1, 1, 0),
    CommandInfo::new("HSTRLEN", 1, 1, 1, READ_ONLY),
    CommandInfo::new("HVALS", 1, 1, 1, READ_ONLY),
    CommandInfo::new("INCR", 1, 1, 1, 0),
    CommandInfo::new("INCRBY", 1, 1, 1, 0),
    CommandInfo::new("INCRBYFLOAT", 1, 1, 1, 0),
    CommandInfo::new("KEYS", 0, 0, 1, KEYLESS | READ_ONLY),
    CommandInfo::new("LINDEX", 1, 1, 1, READ_ONLY),
    CommandInfo::new("LINSERT", 1, 1, 1, 0),
    CommandInfo::new("LLEN", 1, 1, 1, READ_ONLY),
    CommandInfo::new("LMOVE", 1, 2, 1, MULTI_KEY),
    CommandInfo::new("LMPOP", 0, 0, 1, MOVABLE),
    CommandInfo::new("LPOP", 1, 1, 1, 0),
    CommandInfo::new("LPOS", 1, 1, 1, READ_ONLY),
    CommandInfo::new("LPUSH", 1, 1, 1, 0),
    CommandInfo::new("LPUSHX", 1, 1, 1, 0),
    CommandInfo::new("LRANGE", 1, 1, 1, READ_ONLY),
    CommandInfo::new("LREM", 1, 1, 1, 0),
    CommandInfo::new("LSET", 1, 1, 1, 0),
    CommandInfo::new("LTRIM", 1, 1, 1, 0),
    CommandInfo::new("MGET", 1, -1, 1, MULTI_KEY | READ_ONLY),
    CommandInfo::new("MSET", 1, -1, 2, MULTI_KEY),
    CommandInfo::new("MSETNX", 1, -1, 2, MULTI_KEY),
    CommandInfo::new("PERSIST", 1, 1, 1, 0),
    CommandInfo::new("PEXPIRE", 1, 1, 1, 0),
    CommandInfo::new("PEXPIREAT", 1, 1, 1, 0),
    CommandInfo::new("PEXPIRETIME", 1, 1, 1, READ_ONLY),
    CommandInfo::new("PFADD", 1, 1, 1, 0),
    CommandInfo::new("PFCOUNT", 1, -1, 1, MULTI_KEY | READ_ONLY),
    CommandInfo::new("PFMERGE", 1, -1, 1, MULTI_KEY),
    CommandInfo::new("PSETEX", 1, 1, 1, 0),
    CommandInfo::new("PTTL", 1, 1, 1, READ_ONLY),
    CommandInfo::new("PUBLISH", 0, 0, 1, KEYLESS),
    CommandInfo::new("RANDOMKEY", 0, 0, 1, KEYLESS | READ_ONLY),
    CommandInfo::new("RENAME", 1, 2, 1, MULTI_KEY),
    CommandInfo::new("RENAMENX", 1, 2, 1, MULTI_KEY),
    CommandInfo::new("RPOP", 1, 1, 1, 0),
    CommandInfo::new("RPOPLPUSH", 1, 2, 1, MULTI_KEY),
    CommandInfo::new("RPUSH", 1, 1, 1, 0),
    CommandInfo::new("RPUSHX", 1, 1, 1, 0),
    CommandInfo::new("SADD", 1, 1, 1, 0),
    CommandInfo::new("SCARD", 1, 1, 1, READ_ONLY),
    CommandInfo::new("SDIFF", 1, -1, 1, MULTI_KEY | READ_ONLY),
    CommandInfo::new("SDIFFSTORE", 1, -1, 1, MULTI_KEY),
    CommandInfo::new("SET", 1, 1, 1, 0),
    CommandInfo::new("SETBIT", 1, 1, 1, 0),
    CommandInfo::new("SETEX", 1, 1, 1, 0),
    CommandInfo::new("SETNX", 1, 1, 1, 0),
    CommandInfo::new("SETRANGE", 1, 1, 1, 0),
    CommandInfo::new("SINTER", 1, -1, 1, MULTI_KEY | READ_ONLY),
    CommandInfo::new("SINTERCARD", 0, 0, 1, MOVABLE | READ_ONLY),
    CommandInfo::new("SINTERSTORE", 1, -1, 1, MULTI_KEY),
    CommandInfo::new("SISMEMBER", 1, 1, 1, READ_ONLY),
    CommandInfo::new("SMEMBERS", 1, 1, 1, READ_ONLY),
    CommandInfo::new("SMISMEMBER", 1, 1, 1, READ_ONLY),
    CommandInfo::new("SMOVE", 1, 2, 1, MULTI_KEY),
    CommandInfo::new("SORT", 1, 1, 1, MOVABLE),
    CommandInfo::new("SORT_RO", 1, 1, 1, MOVABLE | READ_ONLY),
    CommandInfo::new("SPOP", 1, 1, 1, 0),
    CommandInfo::new("SRANDMEMBER", 1, 1, 1, READ_ONLY),
    CommandInfo::new("SREM", 1, 1, 1, 0),
    CommandInfo::new("SSCAN", 1, 1, 1, READ_ONLY),
    CommandInfo::new("STRLEN", 1, 1, 1, READ_ONLY),
    CommandInfo::new("SUNION", 1, -1, 1, MULTI_KEY | READ_ONLY),
    CommandInfo::new("SUNIONSTORE", 1, -1, 1, MULTI_KEY),
    CommandInfo::new("TOUCH", 1, -1, 1, MULTI_KEY),
    CommandInfo::new("TTL", 1, 1, 1, READ_ONLY),
    CommandInfo::new("TYPE", 1, 1, 1, READ_ONLY),
    CommandInfo::new("UNLINK", 1, -1, 1, MULTI_KEY),
    CommandInfo::new("XADD", 1, 1, 1, 0),
    CommandInfo::new("XLEN", 1, 1, 1, READ_ONLY),
    CommandInfo::new("XRANGE", 1, 1, 1, READ_ONLY),
    CommandInfo::new("XREAD", 0, 0, 1, MOVABLE | READ_ONLY),
    CommandInfo::new("XREADGROUP", 0, 0, 1, MOVABLE),
    CommandInfo::new("ZADD", 1, 1, 1, 0),
    CommandInfo::new("ZCARD", 1, 1, 1, READ_ONLY),
    CommandInfo::new("ZCOUNT", 1, 1, 1, READ_ONLY),
    CommandInfo::new("ZDIFF", 0, 0, 1, MOVABLE | READ_ONLY),
    CommandInfo::new("ZDIFFSTORE", 0, 0, 1, MOVABLE),
    CommandInfo::new("ZINCRBY", 1, 1, 1, 0),
    CommandInfo::new("ZINTER", 0, 0, 1, MOVABLE | READ_ONLY),
    CommandInfo::new("ZINTERSTORE", 0, 0, 1, MOVABLE),
    CommandInfo::new("ZMPOP", 0, 0, 1, MOVABLE),
    CommandInfo::new("ZPOPMAX", 1, 1, 1, 0),
    CommandInfo::new("ZPOPMIN", 1, 1, 1, 0),
    CommandInfo::new("ZRANGE", 1, 1, 1, READ_ONLY),
    CommandInfo::new("ZRANGESTORE", 1, 2, 1, MULTI_KEY),
    CommandInfo::new("ZRANK", 1, 1, 1, READ_ONLY),
    CommandInfo::new("ZREM", 1, 1, 1, 0),
    CommandInfo::new("ZSCORE", 1, 1, 1, READ_ONLY),
    CommandInfo::new("ZUNION", 0, 0, 1, MOVABLE | READ_ONLY),
    CommandInfo::new("ZUNIONSTORE", 0, 0, 1, MOVABLE),
];
