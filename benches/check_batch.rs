//! Benchmarks for batch checks, sequential against parallel.
//!
//! Every generated file has nested declarations, imports and a handful of
//! style and doc violations so that each analyzer does real work.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pycomply::config::{ComplianceConfig, ParallelConfig};
use pycomply::{check_batch, CancellationToken, NoCoverage, SourceInput};
use std::hint::black_box;

fn create_inputs(num_files: usize) -> Vec<SourceInput> {
    (0..num_files)
        .map(|i| {
            let text = format!(
                r#""""Generated module {i}."""
import os
import sys


class Worker{i}:
    """Processes a queue of jobs."""

    def run(self, jobs, retries=3):
        """Run every job, retrying failures."""
        done = []
        for job in jobs:
            attempt = 0
            while attempt < retries and not job.ok:
                attempt += 1
                if job.fatal or attempt > 2:
                    break
            done.append(job if job.ok else None)
        return [d for d in done if d]

    def Report(self):
        print(sys.argv)


def helper_{i}(value):
    return value * 2 if value else 0
"#,
                i = i
            );
            SourceInput::new(format!("pkg/module_{}.py", i), text)
        })
        .collect()
}

fn benchmark_check_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_batch");

    for &size in &[10, 50, 200] {
        let inputs = create_inputs(size);
        group.throughput(Throughput::Elements(size as u64));

        let sequential = ComplianceConfig {
            parallel: ParallelConfig::sequential(),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("sequential", size), &inputs, |b, inputs| {
            b.iter(|| {
                let batch =
                    check_batch(inputs, &NoCoverage, &sequential, &CancellationToken::new());
                black_box(batch)
            });
        });

        let parallel = ComplianceConfig::default();
        group.bench_with_input(BenchmarkId::new("parallel", size), &inputs, |b, inputs| {
            b.iter(|| {
                let batch = check_batch(inputs, &NoCoverage, &parallel, &CancellationToken::new());
                black_box(batch)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_check_batch);
criterion_main!(benches);
