//! Workspace telemetry and `resize` preservation (testable property 7) and
//! the fixed-memory invariant (testable property 5).
use fixjson::{Config, Context, FixJsonError, HashSlot, Mode, Node, Value};

#[test]
fn workspace_stat_reports_capacities_and_live_counts() {
    let mut nodes = [Node::default(); 10];
    let mut slots = [HashSlot::default(); 20];
    let mut c = Context::init(&mut nodes, Some(&mut slots), Mode::Hashed, Config::default()).unwrap();
    c.load(br#"{"a":1}"#).unwrap();

    let stat = c.workspace_stat();
    assert_eq!(stat.node_capacity, 10);
    assert_eq!(stat.hash_capacity, 20);
    assert_eq!(stat.node_live, c.element_count());
    assert_eq!(stat.hash_live, 1); // one Key indexed
}

#[test]
fn element_count_never_exceeds_capacity() {
    let mut nodes = [Node::default(); 6];
    let mut c = Context::init(&mut nodes, None, Mode::Linear, Config::ALLOW_TOPLEVEL_ARRAY).unwrap();
    c.load(b"[]").unwrap();
    let array = c.root().unwrap();

    for i in 0..10 {
        let text = i.to_string();
        let result = c.append_array_value(array, Value::Number(text.as_bytes()));
        assert!(c.element_count() <= c.element_capacity());
        if result.is_err() {
            assert!(matches!(result.unwrap_err(), FixJsonError::OutOfMemory { .. }));
        }
    }
}

#[test]
fn resize_preserves_tree_and_renders_identically() {
    let mut nodes = [Node::default(); 8];
    let mut c = Context::init(&mut nodes, None, Mode::Linear, Config::default()).unwrap();
    c.load(br#"{"a":1,"b":2}"#).unwrap();

    let mut before_buf = [0u8; 64];
    let before_len = c.render(&mut before_buf, true).unwrap();

    let mut bigger = [Node::default(); 64];
    c.resize(&mut bigger, None).unwrap();

    let mut after_buf = [0u8; 64];
    let after_len = c.render(&mut after_buf, true).unwrap();
    assert_eq!(&before_buf[..before_len], &after_buf[..after_len]);
    assert_eq!(c.element_capacity(), 64);

    // The grown workspace still accepts new insertions.
    let root = c.root().unwrap();
    let k = c.add_key(root, b"c").unwrap();
    c.update_key_value(k, Value::Number(b"3")).unwrap();
    let mut final_buf = [0u8; 64];
    let n = c.render(&mut final_buf, true).unwrap();
    assert_eq!(&final_buf[..n], br#"{"a":1,"b":2,"c":3}"#);
}

#[test]
fn resize_rebuilds_hash_index_and_keeps_lookups_working() {
    let mut nodes = [Node::default(); 8];
    let mut slots = [HashSlot::default(); 4];
    let mut c = Context::init(&mut nodes, Some(&mut slots), Mode::Hashed, Config::default()).unwrap();
    c.load(br#"{"a":1,"b":2}"#).unwrap();

    let mut bigger_nodes = [Node::default(); 64];
    let mut bigger_slots = [HashSlot::default(); 64];
    c.resize(&mut bigger_nodes, Some(&mut bigger_slots)).unwrap();

    let root = c.root().unwrap();
    assert!(c.get_key(root, b"a").is_ok());
    assert!(c.get_key(root, b"b").is_ok());
    let err = c.add_key(root, b"a").unwrap_err();
    assert!(matches!(err, FixJsonError::DuplicateKey));
    assert_eq!(c.workspace_stat().hash_capacity, 64);
}

#[test]
fn resize_to_same_or_smaller_buffer_is_rejected() {
    let mut nodes = [Node::default(); 8];
    let mut c = Context::init(&mut nodes, None, Mode::Linear, Config::default()).unwrap();
    c.load(b"{}").unwrap();

    let mut same = [Node::default(); 8];
    let err = c.resize(&mut same, None).unwrap_err();
    assert!(matches!(err, FixJsonError::InvalidParameter(_)));
}

#[test]
fn resize_without_hash_storage_in_hashed_mode_is_rejected() {
    let mut nodes = [Node::default(); 8];
    let mut slots = [HashSlot::default(); 4];
    let mut c = Context::init(&mut nodes, Some(&mut slots), Mode::Hashed, Config::default()).unwrap();
    c.load(b"{}").unwrap();

    let mut bigger_nodes = [Node::default(); 16];
    let err = c.resize(&mut bigger_nodes, None).unwrap_err();
    assert!(matches!(err, FixJsonError::InvalidParameter(_)));
}
