//! Benchmark for the collie report parsers
//!
//! Large clusters list tens of thousands of VDIs and snapshots per refresh.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sheepdog_pool_backend::backends::sheepdog::parser::{parse_node_info, parse_vdi, parse_vdi_list};

fn vdi_report(volumes: usize, snapshots_per_volume: usize) -> String {
    let mut report = String::new();
    for i in 0..volumes {
        for s in 0..snapshots_per_volume {
            report.push_str(&format!(
                "s volume-{:05} {} 10737418240 0 2088763392 1343921684 {:x}\n",
                i,
                s + 1,
                i * 16 + s
            ));
        }
        report.push_str(&format!(
            "= volume-{:05} {} 10737418240 381681664 1707081728 1343921685 {:x}\n",
            i,
            snapshots_per_volume + 1,
            i * 16 + snapshots_per_volume
        ));
    }
    report
}

fn bench_vdi_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_parsers");

    let report = vdi_report(10_000, 2);
    group.throughput(Throughput::Bytes(report.len() as u64));

    group.bench_function("vdi_list_10k_volumes", |b| {
        b.iter(|| {
            let volumes = parse_vdi_list(black_box("sheep"), black_box(&report)).unwrap();
            black_box(volumes);
        });
    });

    group.finish();
}

fn bench_single_reports(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_parsers");
    group.throughput(Throughput::Elements(1));

    let node_info: String = (0..64)
        .map(|i| format!("{} 15245667872 117571104 0%\n", i))
        .chain(std::iter::once(
            "Total 975722743808 7524550656 0% 20972341\n".to_string(),
        ))
        .collect();

    group.bench_function("node_info_64_nodes", |b| {
        b.iter(|| parse_node_info(black_box(&node_info)).unwrap());
    });

    let vdi = vdi_report(1, 32);
    group.bench_function("vdi_32_snapshots", |b| {
        b.iter(|| parse_vdi(black_box(&vdi)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_vdi_list, bench_single_reports);
criterion_main!(benches);
