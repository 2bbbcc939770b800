use criterion::{Criterion, black_box, criterion_group, criterion_main};
use stencil_layout::{
    Alignment, FieldStorage, HaloWidths, LayoutVector, ResolvedLayout, StorageInfo, StorageView,
    origin_offset, resolve_strides, stride_for,
};

fn bench_resolution(c: &mut Criterion) {
    let layout = LayoutVector::new(&[2, 0, 1, 3, 4]);
    let raw_strides = [0usize, 4096, 512, 64, 8, 1];
    let resolved = ResolvedLayout::from_map(&layout);

    let info = StorageInfo::try_new(
        [16, 16, 8, 3, 2],
        &layout,
        HaloWidths::uniform(3, 5),
        Alignment::new(32),
    )
    .unwrap();
    let storage = FieldStorage::<f32>::new(info, 1);

    let mut group = c.benchmark_group("Resolution");

    group.bench_function("stride_for_scan_rank5", |b| {
        b.iter(|| {
            (0..5)
                .map(|i| stride_for(black_box(&layout), i, black_box(&raw_strides)))
                .sum::<usize>()
        })
    });

    group.bench_function("stride_for_resolved_rank5", |b| {
        b.iter(|| {
            (0..5)
                .map(|i| black_box(&resolved).stride_for(i, black_box(&raw_strides)))
                .sum::<usize>()
        })
    });

    group.bench_function("resolve_strides_rank5", |b| {
        b.iter(|| resolve_strides(black_box(storage.info())))
    });

    group.bench_function("origin_offset_rank5", |b| {
        b.iter(|| origin_offset(black_box(&storage), 0))
    });

    group.bench_function("storage_view_rank5", |b| {
        b.iter(|| StorageView::new(black_box(&storage), 0))
    });

    group.finish();
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
