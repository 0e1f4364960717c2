use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crtfx_core::prelude::*;
use std::time::Duration;

fn encode_decode(frames: u32, noise: u8) {
    let (w, h) = (256, 224);
    let mut rgb = vec![0u32; w * h];
    for (n, p) in rgb.iter_mut().enumerate() {
        let v = (n % 255) as u32;
        *p = v << 16 | (v ^ 0xa5) << 8 | (255 - v);
    }
    let mut crt = Crt::new(640, 480).expect("valid raster");
    let mut field = Field::Even;
    for _ in 0..frames {
        crt.encode(&NtscInput {
            rgb: &rgb,
            w,
            h,
            field,
            as_color: true,
        })
        .expect("valid source");
        crt.decode(noise);
        field = field.flip();
    }
}

fn clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("crt");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("clean", |b| b.iter(|| encode_decode(black_box(30), 0)));
    group.finish();
}

fn snowy(c: &mut Criterion) {
    let mut group = c.benchmark_group("crt");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("snowy", |b| b.iter(|| encode_decode(black_box(30), 80)));
    group.finish();
}

criterion_group!(benches, clean, snowy);
criterion_main!(benches);
