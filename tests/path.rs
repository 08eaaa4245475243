//! Dotted-path key resolution and `set_path_separator`.
use fixjson::{Config, Context, ElementType, FixJsonError, Mode, Node};

fn ctx(nodes: &mut [Node]) -> Context<'_> {
    Context::init(nodes, None, Mode::Linear, Config::default()).unwrap()
}

#[test]
fn nested_path_lookup_and_negative_array_index() {
    let mut nodes = [Node::default(); 64];
    let mut c = ctx(&mut nodes);
    c.load(br#"{"a":{"b":[1,2,3]}}"#).unwrap();

    let root = c.root().unwrap();
    let b = c.get_key(root, b"a.b").unwrap();
    let array = c.get_key_value(b).unwrap();
    assert_eq!(c.element_type(array).unwrap(), ElementType::Array);
    assert_eq!(c.array_size(array).unwrap(), 3);

    let last = c.array_value(array, -1).unwrap();
    assert_eq!(c.element_type(last).unwrap(), ElementType::Number);
}

#[test]
fn missing_segment_is_element_not_found() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes);
    c.load(br#"{"a":{"b":1}}"#).unwrap();
    let root = c.root().unwrap();

    assert!(matches!(c.get_key(root, b"a.z").unwrap_err(), FixJsonError::ElementNotFound));
    assert!(matches!(c.get_key(root, b"z").unwrap_err(), FixJsonError::ElementNotFound));
}

#[test]
fn custom_path_separator_is_honored() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes);
    c.load(br#"{"a":{"b":1}}"#).unwrap();
    c.set_path_separator(b'/');
    let root = c.root().unwrap();

    assert!(c.get_key(root, b"a/b").is_ok());
    // The default separator byte is no longer treated specially.
    assert!(c.get_key(root, b"a.b").is_err());
}

#[test]
fn path_longer_than_limit_is_rejected() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes);
    c.load(b"{}").unwrap();
    let root = c.root().unwrap();

    let long_path = vec![b'x'; fixjson::MAX_PATH_LENGTH + 1];
    assert!(matches!(c.get_key(root, &long_path).unwrap_err(), FixJsonError::PathTooLong));
}

#[test]
fn get_key_through_a_key_descends_into_its_object_child() {
    let mut nodes = [Node::default(); 16];
    let mut c = ctx(&mut nodes);
    c.load(br#"{"a":{"b":{"c":1}}}"#).unwrap();
    let root = c.root().unwrap();
    let a_key = c.get_key(root, b"a").unwrap();

    // Starting from the "a" Key handle itself (not its object child) still
    // resolves "b.c" by first descending into a's object.
    let c_key = c.get_key(a_key, b"b.c").unwrap();
    let value = c.get_key_value(c_key).unwrap();
    assert_eq!(c.value(value).unwrap(), b"1");
}
