// scanner.rs - Benchmarks for the flatten + backward scan + completion path
//
// Run with: cargo bench --bench scanner
// Compare baselines: cargo bench --bench scanner -- --baseline before

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sourcehelp::completion_context::find_enclosing_call;
use sourcehelp::flatten::flatten;
use sourcehelp::handlers::completion;
use sourcehelp::parameter_resolver::{ParameterDescriptor, ValueLists, ValueSource};
use sourcehelp::reserved_words::default_keywords;
use sourcehelp::source_help::{FunctionDescriptor, SourceHelp};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A window of `lines` lines ending inside a nested call with `args`
/// completed arguments.
fn make_window(lines: usize, args: usize) -> String {
    let mut out = String::new();
    for i in 0..lines.saturating_sub(1) {
        out.push_str(&format!("v{} = max(a{}, b{}) // line {}\n", i, i, i, i));
    }
    out.push_str("result = outer(inner(1, 2), f(");
    let typed: Vec<String> = (0..args).map(|i| format!("\"arg{}\"", i)).collect();
    out.push_str(&typed.join(", "));
    if args > 0 {
        out.push_str(", ");
    }
    out
}

fn make_registry(functions: usize) -> (SourceHelp, ValueLists) {
    let mut help = SourceHelp::new(default_keywords());
    for i in 0..functions {
        help.add(FunctionDescriptor::new(
            if i % 2 == 0 { "" } else { "Mod" },
            format!("fn{}", i),
            "",
            "builtin",
        ));
    }
    help.add(
        FunctionDescriptor::new("", "f", "", "builtin").with_params(
            (0..8)
                .map(|i| {
                    ParameterDescriptor::from_source(
                        format!("p{}", i),
                        "",
                        ValueSource::Category {
                            category: "values".to_string(),
                        },
                    )
                })
                .collect(),
        ),
    );

    let mut lists = ValueLists::new();
    lists.insert(
        "values".to_string(),
        (0..50).map(|i| format!("value{}", i)).collect(),
    );
    (help, lists)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_enclosing_call");

    for &lines in &[1usize, 5, 20] {
        let flat = flatten(&make_window(lines, 4), "//").unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(lines), &flat, |b, flat| {
            b.iter(|| black_box(find_enclosing_call(black_box(flat))))
        });
    }

    group.finish();
}

fn bench_completion(c: &mut Criterion) {
    let mut group = c.benchmark_group("completion");
    group.sample_size(50);

    for &functions in &[10usize, 500] {
        let (help, lists) = make_registry(functions);
        let value_window = make_window(5, 3);
        let global_window = "x = ".to_string();

        group.bench_with_input(
            BenchmarkId::new("values", functions),
            &value_window,
            |b, window| b.iter(|| black_box(completion(&help, black_box(window), "//", &lists))),
        );
        group.bench_with_input(
            BenchmarkId::new("globals", functions),
            &global_window,
            |b, window| b.iter(|| black_box(completion(&help, black_box(window), "//", &lists))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_scan, bench_completion);
criterion_main!(benches);
