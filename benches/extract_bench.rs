//! Source extraction benchmarks
//!
//! Measures extent scanning and comment collection over generated Ruby
//! files of increasing size, extracting the last method in each file.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use methodlens::SourceExtractor;
use std::hint::black_box;
use std::path::Path;

/// A class with `methods` documented methods of a few nested blocks each.
fn generate_ruby(methods: usize) -> String {
    let mut code = String::from("class Generated\n");
    for i in 0..methods {
        code.push_str(&format!(
            "  # Method number {i}.\n  # Handles \"end\" inside strings.\n  def method_{i}(items, opts = {{}})\n    items.each do |item|\n      if item.respond_to?(:end)\n        puts \"#{{item}} end\"\n      end\n    end\n    value = opts[:value] unless opts.empty?\n    value\n  end\n\n"
        ));
    }
    code.push_str("end\n");
    code
}

fn bench_extract_last_method(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_last_method");
    let extractor = SourceExtractor::default();
    let path = Path::new("generated.rb");

    for methods in [10, 100, 1_000] {
        let code = generate_ruby(methods);
        // The last `def` sits ten lines above the end of the file
        let line = (code.lines().count() - 10) as u32;
        group.throughput(Throughput::Bytes(code.len() as u64));

        group.bench_with_input(BenchmarkId::new("methods", methods), &code, |b, code| {
            b.iter(|| {
                let extraction = extractor
                    .extract(path, black_box(code), line)
                    .expect("extraction failed");
                black_box(extraction)
            });
        });
    }

    group.finish();
}

fn bench_extract_every_method(c: &mut Criterion) {
    let extractor = SourceExtractor::default();
    let path = Path::new("generated.rb");
    let code = generate_ruby(100);
    let starts: Vec<u32> = code
        .lines()
        .enumerate()
        .filter(|(_, line)| line.trim_start().starts_with("def "))
        .map(|(i, _)| i as u32 + 1)
        .collect();

    c.bench_function("extract_every_method_100", |b| {
        b.iter(|| {
            for line in &starts {
                black_box(extractor.extract(path, &code, *line).expect("extraction failed"));
            }
        });
    });
}

criterion_group!(benches, bench_extract_last_method, bench_extract_every_method);
criterion_main!(benches);
