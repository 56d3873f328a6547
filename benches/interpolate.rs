use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use envtab::{EnvReader, EnvSource};

fn bench_interpolate(c: &mut Criterion) {
    let reader = EnvReader::new().env_source(EnvSource::memory());

    let chained = make_chained(2_000);
    c.bench_function("interpolate_chained", |b| {
        b.iter(|| reader.read_str(black_box(&chained)));
    });

    let defaults = make_defaults(2_000);
    c.bench_function("interpolate_defaults", |b| {
        b.iter(|| reader.read_str(black_box(&defaults)));
    });
}

fn make_chained(entries: usize) -> String {
    let mut content = String::with_capacity(entries * 24);
    content.push_str("KEY_0=seed\n");
    for idx in 1..entries {
        let prev = idx - 1;
        writeln!(content, "KEY_{idx}=${{KEY_{prev}}}/{idx}").expect("write to string");
    }
    content
}

fn make_defaults(entries: usize) -> String {
    let mut content = String::with_capacity(entries * 32);
    for idx in 0..entries {
        writeln!(content, "KEY_{idx}=${{UNSET_{idx}:-fallback_{idx}}}").expect("write to string");
    }
    content
}

criterion_group!(benches, bench_interpolate);
criterion_main!(benches);
