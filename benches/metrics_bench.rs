use beta_harness::core::metrics::MetricsCollector;
use beta_harness::core::report::{ReportGenerator, Severity};
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_real_time_metrics(c: &mut Criterion) {
    let mut collector = MetricsCollector::new();
    for i in 0..500 {
        let name = format!("test_{}", i % 50);
        collector.record_test_result(&name, i % 3 != 0);
        collector.record_response_time((i % 100) as f64);
    }

    c.bench_function("get_real_time_metrics", |b| {
        b.iter(|| collector.get_real_time_metrics());
    });

    c.bench_function("get_flaky_tests", |b| {
        b.iter(|| collector.get_flaky_tests(3));
    });
}

fn bench_issue_dedup(c: &mut Criterion) {
    c.bench_function("add_issue_linear_scan", |b| {
        b.iter(|| {
            let mut report = ReportGenerator::new();
            for i in 0..100 {
                report.add_issue(
                    &format!("Issue number {}", i % 25),
                    "description",
                    Severity::Medium,
                    Some("bench_test"),
                    None,
                );
            }
            report.issues().len()
        });
    });
}

criterion_group!(benches, bench_real_time_metrics, bench_issue_dedup);
criterion_main!(benches);
