use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fixjson::{Config, Context, Mode, Node, Value};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn build_document(object_count: usize) -> String {
    let mut rng = ChaCha20Rng::seed_from_u64(0x4a45_5300);
    let mut out = String::from("{");
    for i in 0..object_count {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            r#""key{i}":{{"id":{},"name":"entry{i}","tags":[1,2,3]}}"#,
            rng.random_range(0..1_000_000)
        ));
    }
    out.push('}');
    out
}

fn bench_load(c: &mut Criterion) {
    let small = build_document(10);
    let large = build_document(500);

    c.bench_function("load_small_document", |b| {
        b.iter(|| {
            let mut nodes = vec![Node::default(); 256];
            let mut ctx = Context::init(&mut nodes, None, Mode::Linear, Config::default()).unwrap();
            ctx.load(black_box(small.as_bytes())).unwrap();
            black_box(ctx.element_count());
        })
    });

    c.bench_function("load_large_document", |b| {
        b.iter(|| {
            let mut nodes = vec![Node::default(); 8_000];
            let mut ctx = Context::init(&mut nodes, None, Mode::Linear, Config::default()).unwrap();
            ctx.load(black_box(large.as_bytes())).unwrap();
            black_box(ctx.element_count());
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let large = build_document(500);
    let mut nodes = vec![Node::default(); 8_000];
    let mut ctx = Context::init(&mut nodes, None, Mode::Linear, Config::default()).unwrap();
    ctx.load(large.as_bytes()).unwrap();
    let len = ctx.evaluate(true);
    let mut buf = vec![0u8; len];

    c.bench_function("render_large_document_compact", |b| {
        b.iter(|| {
            black_box(ctx.render(&mut buf, true).unwrap());
        })
    });
}

fn bench_get_key_linear_vs_hashed(c: &mut Criterion) {
    let doc = build_document(200);

    let mut linear_nodes = vec![Node::default(); 4_000];
    let mut linear = Context::init(&mut linear_nodes, None, Mode::Linear, Config::default()).unwrap();
    linear.load(doc.as_bytes()).unwrap();

    let mut hashed_nodes = vec![Node::default(); 4_000];
    let mut hashed_slots = vec![fixjson::HashSlot::default(); 1_500];
    let mut hashed = Context::init(&mut hashed_nodes, Some(&mut hashed_slots), Mode::Hashed, Config::default()).unwrap();
    hashed.load(doc.as_bytes()).unwrap();

    c.bench_function("get_key_linear", |b| {
        b.iter(|| {
            let root = linear.root().unwrap();
            black_box(linear.get_key(root, b"key199").unwrap());
        })
    });

    c.bench_function("get_key_hashed", |b| {
        b.iter(|| {
            let root = hashed.root().unwrap();
            black_box(hashed.get_key(root, b"key199").unwrap());
        })
    });
}

fn bench_append_array_value(c: &mut Criterion) {
    let numbers: Vec<String> = (0..1_000).map(|i| i.to_string()).collect();

    c.bench_function("append_array_value_1000", |b| {
        b.iter(|| {
            let mut nodes = vec![Node::default(); 1_100];
            let mut ctx = Context::init(&mut nodes, None, Mode::Linear, Config::ALLOW_TOPLEVEL_ARRAY).unwrap();
            ctx.load(b"[]").unwrap();
            let array = ctx.root().unwrap();
            for text in &numbers {
                ctx.append_array_value(array, Value::Number(text.as_bytes())).unwrap();
            }
            black_box(ctx.array_size(array).unwrap());
        })
    });
}

criterion_group!(
    benches,
    bench_load,
    bench_render,
    bench_get_key_linear_vs_hashed,
    bench_append_array_value,
);
criterion_main!(benches);
