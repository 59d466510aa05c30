//! Benchmarks for VFX-RS operations.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use vfx_lut::{CdlData, CdlStyle};
use vfx_math::Mat4;
use vfx_ops::cdl::{CdlOp, DEFAULT_LUMA};
use vfx_ops::matrix::{MatrixOp, MatrixRenderer};
use vfx_ops::{parallel, Op, OpList};

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn ramp(pixels: usize) -> Vec<f32> {
    (0..pixels * 4).map(|i| (i % 1024) as f32 / 1023.0).collect()
}

/// Benchmark the four matrix renderer shapes.
fn bench_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix");

    let full = Mat4::from_rows([
        [0.9, 0.1, 0.0, 0.0],
        [0.05, 0.9, 0.05, 0.0],
        [0.0, 0.1, 0.9, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    let shapes = [
        ("scale", MatrixOp::scale([1.1, 1.0, 0.9, 1.0])),
        ("scale_offset", MatrixOp::scale([1.1, 1.0, 0.9, 1.0]).with_offset([0.01, 0.0, -0.01, 0.0])),
        ("matrix", MatrixOp::new(full)),
        ("matrix_offset", MatrixOp::new(full).with_offset([0.01, 0.0, -0.01, 0.0])),
    ];

    for size in SIZES {
        let src = ramp(size);
        group.throughput(Throughput::Elements(size as u64));
        for (name, op) in &shapes {
            let renderer = MatrixRenderer::compile(op);
            group.bench_with_input(BenchmarkId::new(*name, size), &src, |b, src| {
                let mut buf = src.clone();
                b.iter(|| renderer.apply(black_box(&mut buf)))
            });
        }
    }

    group.finish();
}

/// Benchmark CDL evaluation per style.
fn bench_cdl(c: &mut Criterion) {
    let mut group = c.benchmark_group("cdl");
    let grade = CdlData::new([1.2, 1.0, 0.9], [0.01, 0.0, -0.02], [1.1, 1.0, 0.95], 1.15);

    let size = 100_000;
    let src = ramp(size);
    group.throughput(Throughput::Elements(size as u64));

    for style in CdlStyle::ALL {
        let op = CdlOp::new(&grade.clone().with_style(style), DEFAULT_LUMA).unwrap();
        group.bench_with_input(BenchmarkId::new(style.clf_name(), size), &src, |b, src| {
            let mut buf = src.clone();
            b.iter(|| op.apply_rgba(black_box(&mut buf)))
        });
    }

    group.finish();
}

/// Benchmark serial vs parallel op list application.
fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("op_list");
    let grade = CdlData::new([1.2, 1.0, 0.9], [0.01, 0.0, -0.02], [1.1, 1.0, 0.95], 1.15);

    let mut ops = OpList::new();
    ops.push(Op::Cdl(CdlOp::new(&grade, DEFAULT_LUMA).unwrap()));
    ops.push(Op::Matrix(MatrixOp::saturation(0.9, DEFAULT_LUMA)));

    let size = 1920 * 1080;
    let src = ramp(size);
    group.throughput(Throughput::Elements(size as u64));
    group.sample_size(20);

    group.bench_function("serial_1080p", |b| {
        let mut buf = src.clone();
        b.iter(|| ops.apply_rgba(black_box(&mut buf)))
    });

    group.bench_function("parallel_1080p", |b| {
        let mut buf = src.clone();
        b.iter(|| parallel::apply_rgba_par(&ops, black_box(&mut buf)).unwrap())
    });

    group.finish();
}

/// Benchmark collection parsing.
fn bench_parse(c: &mut Criterion) {
    let mut xml = String::from("<ColorCorrectionCollection xmlns=\"urn:ASC:CDL:v1.01\">\n");
    for i in 0..200 {
        xml.push_str(&format!(
            "<ColorCorrection id=\"cc{i:04}\"><SOPNode><Slope>1.1 1.0 0.9</Slope>\
             <Offset>0.01 0 -0.01</Offset><Power>1 1 1.1</Power></SOPNode>\
             <SatNode><Saturation>0.9</Saturation></SatNode></ColorCorrection>\n"
        ));
    }
    xml.push_str("</ColorCorrectionCollection>\n");

    c.bench_function("parse_ccc_200", |b| {
        b.iter(|| vfx_lut::cdl::parse_str(black_box(&xml), "<bench>").unwrap())
    });
}

criterion_group!(benches, bench_matrix, bench_cdl, bench_parallel, bench_parse);
criterion_main!(benches);
