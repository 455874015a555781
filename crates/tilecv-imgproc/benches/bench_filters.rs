use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use tilecv_image::Image;
use tilecv_imgproc::{
    canny::canny,
    filter::{gaussian_blur, median_blur},
    morphology::{dilate, Kernel, KernelShape},
};

fn random_image(width: usize, height: usize) -> Image<u8, 3> {
    let mut rng = rand::rng();
    let data = (0..width * height * 3).map(|_| rng.random()).collect();
    Image::new([width, height].into(), data).unwrap()
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Filters");

    for (width, height) in [(256, 224), (840, 480)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{width}x{height}");

        let image = random_image(*width, *height);
        let output = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
        let edges = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();

        for kernel_size in [(3, 3), (55, 3)].iter() {
            group.bench_with_input(
                BenchmarkId::new(
                    format!("gaussian_blur_{}x{}", kernel_size.0, kernel_size.1),
                    &parameter_string,
                ),
                &(&image, &output),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| black_box(gaussian_blur(src, &mut dst, *kernel_size, (0.0, 0.0))))
                },
            );
        }

        group.bench_with_input(
            BenchmarkId::new("median_blur_3x3", &parameter_string),
            &(&image, &output),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| black_box(median_blur(src, &mut dst, 3)))
            },
        );

        let ellipse = Kernel::new(KernelShape::Ellipse {
            width: 17,
            height: 17,
        })
        .unwrap();

        group.bench_with_input(
            BenchmarkId::new("dilate_ellipse_17x17", &parameter_string),
            &(&image, &output),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| black_box(dilate(src, &mut dst, &ellipse)))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("canny", &parameter_string),
            &(&image, &edges),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| black_box(canny(src, &mut dst, 50.0, 150.0)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
