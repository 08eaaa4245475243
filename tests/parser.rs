//! Parser state-machine behavior: top-level document gating, structural
//! errors, and partial-tree-on-failure semantics.
use fixjson::{Config, Context, FixJsonError, Mode, Node};

fn ctx(nodes: &mut [Node], config: Config) -> Context<'_> {
    Context::init(nodes, None, Mode::Linear, config).unwrap()
}

#[test]
fn toplevel_array_rejected_without_the_flag() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes, Config::empty());
    let err = c.load(b"[1,2,3]").unwrap_err();
    assert!(matches!(err, FixJsonError::UnexpectedToken { .. }));
}

#[test]
fn toplevel_array_accepted_with_the_flag() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes, Config::ALLOW_TOPLEVEL_ARRAY);
    c.load(b"[1,2,3]").unwrap();
    assert_eq!(c.array_size(c.root().unwrap()).unwrap(), 3);
}

#[test]
fn toplevel_primitive_rejected_without_the_flag() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes, Config::ALLOW_TOPLEVEL_ARRAY);
    let err = c.load(b"42").unwrap_err();
    assert!(matches!(err, FixJsonError::UnexpectedToken { .. }));
}

#[test]
fn toplevel_primitive_accepted_with_the_flag() {
    let mut nodes = [Node::default(); 4];
    let mut c = ctx(&mut nodes, Config::ALLOW_TOPLEVEL_PRIMITIVE);
    c.load(b"true").unwrap();
    let mut buf = [0u8; 8];
    let n = c.render(&mut buf, true).unwrap();
    assert_eq!(&buf[..n], b"true");
}

#[test]
fn missing_colon_is_unexpected_token() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes, Config::default());
    let err = c.load(br#"{"a" 1}"#).unwrap_err();
    assert!(matches!(err, FixJsonError::UnexpectedToken { .. }));
}

#[test]
fn mismatched_closing_bracket_is_unexpected_token() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes, Config::default());
    let err = c.load(br#"{"a":[1,2}"#).unwrap_err();
    assert!(matches!(err, FixJsonError::UnexpectedToken { .. }));
}

#[test]
fn trailing_garbage_after_document_is_unexpected_token() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes, Config::default());
    let err = c.load(br#"{"a":1} 5"#).unwrap_err();
    assert!(matches!(err, FixJsonError::UnexpectedToken { .. }));
}

#[test]
fn duplicate_key_during_parse_is_rejected() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes, Config::default());
    let err = c.load(br#"{"a":1,"a":2}"#).unwrap_err();
    assert!(matches!(err, FixJsonError::DuplicateKey));
}

#[test]
fn allow_duplicate_keys_flag_lets_parse_accept_repeats() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes, Config::ALLOW_DUPLICATE_KEYS);
    c.load(br#"{"a":1,"a":2}"#).unwrap();
    assert_eq!(c.stat().keys, 2);
}

#[test]
fn failed_parse_leaves_a_partial_tree_and_status_block() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes, Config::default());
    let err = c.load(br#"{"a":1,"b":}"#).unwrap_err();
    assert!(matches!(err, FixJsonError::UnexpectedToken { .. }));
    // The object and its first complete key/value survive the failed parse.
    assert!(c.stat().keys >= 1);
    assert_eq!(c.status_block().status, c.status());
}

#[test]
fn out_of_memory_during_parse_reports_requested_and_available() {
    let mut nodes = [Node::default(); 2];
    let mut c = ctx(&mut nodes, Config::default());
    let err = c.load(br#"{"a":1,"b":2}"#).unwrap_err();
    assert!(matches!(err, FixJsonError::OutOfMemory { .. }));
}
