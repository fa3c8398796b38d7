use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use quikdown::{ParseOptions, parse};

fn gen_heading_doc(n: usize) -> String {
    (1..=n)
        .map(|i| format!("# Heading {i}\n\nSome paragraph text under heading {i}.\n\n"))
        .collect()
}

fn gen_nested_list(depth: usize) -> String {
    let mut s = String::new();
    for i in 0..depth {
        s.push_str(&"  ".repeat(i % 8));
        s.push_str(&format!("- item {i}\n"));
    }
    s
}

fn gen_table(rows: usize, cols: usize) -> String {
    let mut s = String::new();
    s.push('|');
    for c in 0..cols {
        s.push_str(&format!(" col{c} |"));
    }
    s.push('\n');
    s.push('|');
    for c in 0..cols {
        s.push_str(if c % 3 == 1 { " :---: |" } else { " --- |" });
    }
    s.push('\n');
    for r in 0..rows {
        s.push('|');
        for c in 0..cols {
            s.push_str(&format!(" r{r}c{c} |"));
        }
        s.push('\n');
    }
    s
}

fn gen_inline_heavy() -> String {
    let mut s = String::new();
    for i in 0..200 {
        s.push_str(&format!(
            "This has **bold**, *italic*, `code`, ~~strike~~, [link](http://x.com/{i}), https://y.org/{i} and more.\n\n"
        ));
    }
    s
}

fn gen_code_blocks(n: usize) -> String {
    (0..n)
        .map(|i| format!("```rust\nfn func_{i}() {{\n    println!(\"hello\");\n}}\n```\n\n"))
        .collect()
}

fn gen_unmatched(n: usize) -> String {
    (0..n)
        .map(|i| format!("**open {i} *and [bracket ~~tilde `tick\n"))
        .collect()
}

// --- Option variants ---

fn variants() -> Vec<(&'static str, ParseOptions)> {
    vec![
        ("classes", ParseOptions::default()),
        (
            "inline_styles",
            ParseOptions {
                inline_styles: true,
                ..Default::default()
            },
        ),
        (
            "bidirectional",
            ParseOptions {
                bidirectional: true,
                ..Default::default()
            },
        ),
    ]
}

// --- Benchmark helper ---

fn bench_group(c: &mut Criterion, group_name: &str, input: &str) {
    let label = format!("{} bytes", input.len());
    let mut group = c.benchmark_group(group_name);
    for (name, opts) in variants() {
        group.bench_with_input(BenchmarkId::new(name, &label), input, |b, input| {
            b.iter(|| parse(black_box(input), &opts))
        });
    }
    group.finish();
}

// --- Benchmarks ---

fn bench_sizes(c: &mut Criterion) {
    let base = gen_inline_heavy();
    for &size in &[1_000, 10_000, 100_000] {
        let input: String = base.chars().cycle().take(size).collect();
        bench_group(c, &format!("document_size/{size} bytes"), &input);
    }
}

fn bench_block_types(c: &mut Criterion) {
    let cases: Vec<(&str, String)> = vec![
        ("headings", gen_heading_doc(200)),
        ("nested_lists", gen_nested_list(200)),
        ("table", gen_table(100, 10)),
        ("code_blocks", gen_code_blocks(100)),
    ];
    for (name, input) in &cases {
        bench_group(c, &format!("block_types/{name}"), input);
    }
}

fn bench_inline(c: &mut Criterion) {
    let input = gen_inline_heavy();
    bench_group(c, "inline_heavy", &input);
}

fn bench_recovery(c: &mut Criterion) {
    let input = gen_unmatched(300);
    bench_group(c, "unmatched_delimiters", &input);
}

criterion_group!(
    benches,
    bench_sizes,
    bench_block_types,
    bench_inline,
    bench_recovery,
);
criterion_main!(benches);
