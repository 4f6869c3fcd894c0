use crate::{RedisError, RedisErrorKind};

#[test]
fn parse_moved() {
    let error = RedisError::from("MOVED 3999 10.0.0.3:6379");
    assert_eq!(
        RedisErrorKind::Moved {
            hash_slot: 3999,
            address: ("10.0.0.3".to_owned(), 6379)
        },
        error.kind
    );
    assert_eq!("", error.description);
    assert_eq!("MOVED 3999 10.0.0.3:6379", error.to_string());
}

#[test]
fn parse_ask() {
    let error = RedisError::from("ASK 7000 10.0.0.2:6380");
    assert_eq!(
        RedisErrorKind::Ask {
            hash_slot: 7000,
            address: ("10.0.0.2".to_owned(), 6380)
        },
        error.kind
    );
    assert_eq!("ASK 7000 10.0.0.2:6380", error.to_string());
}

#[test]
fn parse_transient_cluster_errors() {
    let error = RedisError::from("TRYAGAIN Multiple keys request during rehashing of slot");
    assert_eq!(RedisErrorKind::TryAgain, error.kind);
    assert_eq!(
        "Multiple keys request during rehashing of slot",
        error.description
    );

    let error = RedisError::from("CLUSTERDOWN The cluster is down");
    assert_eq!(RedisErrorKind::ClusterDown, error.kind);

    let error = RedisError::from("TRYAGAIN");
    assert_eq!(RedisErrorKind::TryAgain, error.kind);
    assert_eq!("TRYAGAIN", error.to_string());
}

#[test]
fn malformed_redirections_degrade_to_other() {
    // missing address token
    let error = RedisError::from("ASK 7000");
    assert_eq!(RedisErrorKind::Other("ASK 7000".to_owned()), error.kind);

    // unparsable slot
    let error = RedisError::from("MOVED slot 10.0.0.3:6379");
    assert!(matches!(error.kind, RedisErrorKind::Other(_)));

    // missing port
    let error = RedisError::from("ASK 7000 10.0.0.2");
    assert!(matches!(error.kind, RedisErrorKind::Other(_)));

    // extra token
    let error = RedisError::from("MOVED 3999 10.0.0.3:6379 extra");
    assert!(matches!(error.kind, RedisErrorKind::Other(_)));
}

#[test]
fn parse_plain_server_error() {
    let error = RedisError::from("ERR unknown command");
    assert_eq!(RedisErrorKind::Err, error.kind);
    assert_eq!("unknown command", error.description);
    assert_eq!("ERR unknown command", error.to_string());

    let error = RedisError::from("WRONGTYPE Operation against a key");
    assert_eq!(RedisErrorKind::WrongType, error.kind);

    let error = RedisError::from("CROSSSLOT Keys in request don't hash to the same slot");
    assert_eq!(RedisErrorKind::CrossSlot, error.kind);
}

#[test]
fn unknown_error_code_is_kept_verbatim() {
    let error = RedisError::from("SOMETHINGODD went wrong");
    assert_eq!(
        RedisErrorKind::Other("SOMETHINGODD".to_owned()),
        error.kind
    );
    assert_eq!("went wrong", error.description);
}
