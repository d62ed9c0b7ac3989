use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use html::{VecSink, balance, tokenize};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;

fn make_blocks(blocks: usize) -> String {
    let mut out = String::with_capacity(blocks * 64);
    for i in 0..blocks {
        out.push_str("<div class=box><span title='t&amp;'>hello</span><img src=x>");
        if i % 3 == 0 {
            out.push_str("<ul><li>one<li>two</ul>");
        }
        out.push_str("</div>");
    }
    out
}

fn make_rawtext_adversarial(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 32);
    body.push_str("<script>");
    while body.len() < bytes {
        body.push_str("</scri");
        body.push('<');
        body.push_str("pt");
    }
    body.push_str("</script>");
    body
}

fn bench_tokenize(c: &mut Criterion) {
    for (label, blocks) in [("small", SMALL_BLOCKS), ("large", LARGE_BLOCKS)] {
        let input = make_blocks(blocks);
        c.bench_function(&format!("bench_tokenize_{label}"), |b| {
            b.iter(|| {
                let stream = tokenize(black_box(&input));
                black_box(stream.len());
            });
        });
    }
}

fn bench_balance_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_balance_large", |b| {
        b.iter_batched(
            || tokenize(&input),
            |stream| {
                let mut sink = VecSink::new();
                balance(stream, &mut sink);
                black_box(sink.events.len());
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_rawtext_adversarial(c: &mut Criterion) {
    let input = make_rawtext_adversarial(1 << 20);
    c.bench_function("bench_rawtext_adversarial", |b| {
        b.iter(|| black_box(tokenize(black_box(&input)).len()));
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_balance_large,
    bench_rawtext_adversarial
);
criterion_main!(benches);
