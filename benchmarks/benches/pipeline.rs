use benchmarks::{requests, requests_csv};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use immo_price::batch::predict_csv;
use immo_price::fixtures;
use immo_price::{PredictionService, ResponseVariant, ServiceConfig};

fn service() -> PredictionService {
    PredictionService::new(fixtures::loaded(), ServiceConfig::default()).unwrap()
}

fn bench_features(c: &mut Criterion) {
    let service = service();
    let requests = requests(64);

    c.bench_function("features", |b| {
        let mut i = 0;
        b.iter(|| {
            let features = service.features(black_box(&requests[i % requests.len()]));
            i += 1;
            black_box(features.unwrap());
        });
    });
}

fn bench_respond(c: &mut Criterion) {
    let service = service();
    let requests = requests(64);

    for variant in [ResponseVariant::Ranged, ResponseVariant::Plain] {
        let name = match variant {
            ResponseVariant::Ranged => "respond_ranged",
            ResponseVariant::Plain => "respond_plain",
        };
        c.bench_function(name, |b| {
            let mut i = 0;
            b.iter(|| {
                let response = service.respond(black_box(&requests[i % requests.len()]), variant);
                i += 1;
                black_box(response.unwrap());
            });
        });
    }
}

fn bench_batch(c: &mut Criterion) {
    let service = service();

    // Test different batch sizes
    for size in [10, 100, 1000].iter() {
        let input = requests_csv(*size);
        c.bench_with_input(BenchmarkId::new("predict_csv", size), &input, |b, input| {
            b.iter(|| {
                let mut out = Vec::with_capacity(input.len());
                let summary = predict_csv(&service, black_box(input.as_bytes()), &mut out);
                black_box(summary.unwrap());
            });
        });
    }
}

criterion_group!(benches, bench_features, bench_respond, bench_batch);
criterion_main!(benches);
