#![forbid(unsafe_code)]

//! Benchmarks for option filtering and keystroke handling.

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lookup::filter::OptionFilter;
use lookup::prelude::*;

fn build_options(count: usize) -> Vec<Choice<usize>> {
    (0..count)
        .map(|i| Choice::new(i, format!("Option {i} of the catalog")))
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let projection = Projection::choice();

    for count in [100, 1_000, 10_000] {
        let options = build_options(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("substring", count), &options, |b, options| {
            let filter = OptionFilter::new();
            b.iter(|| filter.apply(black_box("42"), options, &projection));
        });

        group.bench_with_input(BenchmarkId::new("below_threshold", count), &options, |b, options| {
            let filter = OptionFilter::new().min_query_len(3);
            b.iter(|| filter.apply(black_box("42"), options, &projection));
        });

        group.bench_with_input(BenchmarkId::new("custom_predicate", count), &options, |b, options| {
            let filter = OptionFilter::new().predicate(|q: &str, c: &Choice<usize>| c.label.starts_with(q));
            b.iter(|| filter.apply(black_box("Option 9"), options, &projection));
        });
    }

    group.finish();
}

fn bench_typing(c: &mut Criterion) {
    let options = build_options(1_000);
    c.bench_function("field/type_query", |b| {
        b.iter_batched(
            || {
                let mut field = LookupField::choices(options.clone());
                field.focus();
                field
            },
            |mut field| {
                for ch in "catalog 99".chars() {
                    let _ = field.handle_key(&KeyMsg::from_char(ch));
                }
                field
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("field/navigate", |b| {
        let mut field = LookupField::choices(options.clone());
        field.focus();
        let down = KeyMsg::from_type(KeyType::Down);
        b.iter(|| field.handle_key(black_box(&down)));
    });
}

criterion_group!(benches, bench_filter, bench_typing);
criterion_main!(benches);
