use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use strided_buffer::{copy_elementwise, CopyStrategy, Dimension, StridedBuffer};

const DIM: Dimension = Dimension::new(1920, 1080);
const PADDED_STRIDE: usize = 2048;
const WIDER_STRIDE: usize = 2112;

fn padded_len(stride: usize) -> usize {
    stride * (DIM.height - 1) + DIM.width
}

fn bench_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy-1080p-u8");

    let dense_src = StridedBuffer::<u8>::filled(DIM, 17).expect("allocate source");
    let mut dense_dst = StridedBuffer::<u8>::new(DIM).expect("allocate destination");
    assert_eq!(dense_dst.copy_strategy(&dense_src), CopyStrategy::Linear);
    group.bench_function("linear", |b| {
        b.iter(|| dense_dst.copy_from(black_box(&dense_src)))
    });

    let mut src_data = vec![17u8; padded_len(PADDED_STRIDE)];
    let mut dst_data = vec![0u8; padded_len(PADDED_STRIDE)];
    let padded_src = StridedBuffer::from_slice_with_stride(&mut src_data, DIM, PADDED_STRIDE);
    let mut padded_dst = StridedBuffer::from_slice_with_stride(&mut dst_data, DIM, PADDED_STRIDE);
    assert_eq!(
        padded_dst.copy_strategy(&padded_src),
        CopyStrategy::Footprint
    );
    group.bench_function("footprint", |b| {
        b.iter(|| padded_dst.copy_from(black_box(&padded_src)))
    });

    let mut wide_data = vec![0u8; padded_len(WIDER_STRIDE)];
    let mut wide_dst = StridedBuffer::from_slice_with_stride(&mut wide_data, DIM, WIDER_STRIDE);
    assert_eq!(wide_dst.copy_strategy(&padded_src), CopyStrategy::RowByRow);
    group.bench_function("row-by-row", |b| {
        b.iter(|| wide_dst.copy_from(black_box(&padded_src)))
    });

    group.bench_function("elementwise", |b| {
        b.iter(|| copy_elementwise(&mut wide_dst, black_box(&padded_src)))
    });

    group.finish();
}

criterion_group!(benches, bench_copy);
criterion_main!(benches);
