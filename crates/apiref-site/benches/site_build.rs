//! Benchmarks for site assembly.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use apiref_meta::{ApiEntry, ModuleIndex, Parameter};
use apiref_renderer::PageTemplate;
use apiref_site::SiteBuilder;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Generate an index with cross-referencing descriptions.
fn generate_index(modules: usize, entries_per_module: usize) -> ModuleIndex {
    let mut index = ModuleIndex::new();
    for m in 0..modules {
        for e in 0..entries_per_module {
            let symbol = format!("Module{m}Function{e}");
            let mut description = format!("{symbol}() processes the image.");
            description.push_str(&format!(
                " See Module{}Function{} for the inverse.",
                (m + 1) % modules,
                e
            ));
            let entry = ApiEntry::synthesized(
                &symbol,
                "MagickBooleanType",
                vec![
                    Parameter::new("image", "Image *").with_description("the image."),
                    Parameter::new("x", "const ssize_t").with_description("the region offset."),
                    Parameter::new("y", "const ssize_t").with_description("the region offset."),
                    Parameter::new("exception", "ExceptionInfo *")
                        .with_description("return any errors or warnings in this structure."),
                ],
            )
            .unwrap()
            .with_description(description);
            index.add_entry(&format!("module-{m}"), entry).unwrap();
        }
    }
    index
}

fn bench_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("site_check");

    for (modules, entries) in [(5, 10), (20, 30), (60, 50)] {
        group.throughput(Throughput::Elements((modules * entries) as u64));
        for parallel in [false, true] {
            let builder =
                SiteBuilder::new(generate_index(modules, entries), PageTemplate::default()).with_parallel(parallel);
            let mode = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(
                BenchmarkId::new(mode, format!("{modules}m_{entries}e")),
                &builder,
                |b, builder| b.iter(|| builder.check()),
            );
        }
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    let builder = SiteBuilder::new(generate_index(20, 30), PageTemplate::default());

    c.bench_function("site_build_20_modules", |b| {
        b.iter(|| builder.build(temp_dir.path()));
    });
}

criterion_group!(benches, bench_check, bench_build);
criterion_main!(benches);
