use crate::cluster::{command_info::COMMAND_INFOS, find_command_info};

#[test]
fn lookup_is_case_insensitive() {
    assert!(find_command_info(b"get").is_some());
    assert!(find_command_info(b"Get").is_some());
    assert!(find_command_info(b"GET").is_some());
    assert!(find_command_info(b"NOSUCHCOMMAND").is_none());
}

#[test]
fn single_key_read_only_command() {
    let info = find_command_info(b"GET").unwrap();
    assert_eq!(1, info.first_key);
    assert_eq!(1, info.last_key);
    assert_eq!(1, info.key_step);
    assert!(info.is_read_only());
    assert!(!info.is_keyless());
    assert!(!info.is_multi_key());
    assert!(!info.is_movable());
}

#[test]
fn alternating_multi_key_command() {
    let info = find_command_info(b"MSET").unwrap();
    assert_eq!(1, info.first_key);
    assert_eq!(-1, info.last_key);
    assert_eq!(2, info.key_step);
    assert!(info.is_multi_key());
    assert!(!info.is_read_only());
}

#[test]
fn keyless_command() {
    let info = find_command_info(b"DBSIZE").unwrap();
    assert!(info.is_keyless());
    assert!(info.is_read_only());

    let info = find_command_info(b"FLUSHDB").unwrap();
    assert!(info.is_keyless());
    assert!(!info.is_read_only());
}

#[test]
fn movable_keys_commands() {
    for name in [&b"EVAL"[..], b"EVALSHA", b"SORT", b"GEORADIUS", b"ZUNIONSTORE"] {
        let info = find_command_info(name).unwrap();
        assert!(info.is_movable(), "{}", info.name);
    }
}

#[test]
fn table_is_sorted_for_binary_search() {
    for window in COMMAND_INFOS.windows(2) {
        assert!(
            window[0].name < window[1].name,
            "{} >= {}",
            window[0].name,
            window[1].name
        );
    }
}
