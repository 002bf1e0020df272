/// Performance benchmarks for path merging and rendering
///
/// Run with: cargo bench
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pathmerge::{build_alignment, RenderConfig, Renderer, Stream};

const GROUP_WIDTH: usize = 80;

/// Synthetic decode path and report with `hits` hits of `len` match states each
fn generate_payloads(hits: usize, len: usize) -> (String, String) {
    let mut steps = Vec::new();
    let mut report = String::from(">> bench\n\n");
    let pad = " ".repeat(17);

    for h in 0..hits {
        steps.push("AC,N,,".to_string());
        steps.push(",B,,".to_string());
        for k in 1..=len {
            steps.push(format!("AAA,M{k},AAA,K"));
        }
        steps.push(",E,,".to_string());

        report.push_str(&format!("  == domain {}\n", h + 1));
        for start in (0..len).step_by(GROUP_WIDTH) {
            let width = GROUP_WIDTH.min(len - start);
            let (first, last) = (start + 1, start + width);
            report.push_str(&format!(
                "{pad}{} CS\n  profile {first:>6} {} {last}\n{pad}{}\n  seq     {first:>6} {} {last}\n{pad}{} PP\n",
                "C".repeat(width),
                "k".repeat(width),
                "k".repeat(width),
                "K".repeat(width),
                "9".repeat(width),
            ));
        }
        report.push('\n');
    }
    steps.push(",T,,".to_string());
    (steps.join(";"), report)
}

/// Benchmark: parse both payloads and merge them
fn bench_build_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_alignment");

    for hits in [1, 10, 100].iter() {
        let (decode, report) = generate_payloads(*hits, 300);
        group.throughput(Throughput::Elements(*hits as u64 * 300));
        group.bench_with_input(BenchmarkId::from_parameter(hits), hits, |b, _| {
            b.iter(|| build_alignment(black_box(&decode), black_box(&report)).unwrap())
        });
    }
    group.finish();
}

/// Benchmark: render every stream, whole path and wrapped layout
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let (decode, report) = generate_payloads(20, 300);
    let path = build_alignment(&decode, &report).unwrap();
    let streams = Stream::all();

    let renderer = Renderer::default();
    group.bench_function("all_streams", |b| {
        b.iter(|| renderer.render(black_box(&path), &streams, None).unwrap())
    });

    let hit = path.hits()[0].interval();
    group.bench_function("one_hit", |b| {
        b.iter(|| renderer.render(black_box(&path), &streams, Some(hit)).unwrap())
    });

    let wrapped = Renderer::new(RenderConfig::default().with_width(Some(99)));
    group.bench_function("layout_99", |b| {
        b.iter(|| wrapped.layout(black_box(&path), &streams, None, None).unwrap())
    });

    group.bench_function("domain_table", |b| {
        b.iter(|| {
            renderer
                .domain_table(black_box(&path), "bench", "profile")
                .unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build_alignment, bench_render);
criterion_main!(benches);
