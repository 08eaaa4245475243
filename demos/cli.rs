//! Small end-to-end demo: load a document from stdin (or a built-in sample),
//! add a key through the builder API, and print the result back out.
use std::io::Read;

use fixjson::{Config, Context, Mode, Node, Value};

const SAMPLE: &[u8] = br#"{"trainer":{"name":"Ash"},"team":["Pikachu","Charizard"]}"#;

fn main() {
    let mut input = Vec::new();
    if std::io::stdin().read_to_end(&mut input).unwrap_or(0) == 0 {
        input.extend_from_slice(SAMPLE);
    }

    let mut nodes = [Node::default(); 256];
    let mut ctx = Context::init(&mut nodes, None, Mode::Linear, Config::default())
        .expect("workspace large enough for init");

    if let Err(err) = ctx.load(&input) {
        eprintln!("parse failed: {err} (status {:?})", ctx.status_block());
        std::process::exit(1);
    }

    let root = ctx.root().unwrap();
    if let Ok(trainer) = ctx.get_key(root, b"trainer") {
        let badges = ctx.add_key(trainer, b"badges").unwrap();
        ctx.update_key_value(badges, Value::Number(b"8")).unwrap();
    }

    let len = ctx.evaluate(false);
    let mut out = vec![0u8; len];
    let written = ctx.render(&mut out, false).unwrap();
    println!("{}", String::from_utf8_lossy(&out[..written]));
    println!("elements: {:?}", ctx.stat());
}
