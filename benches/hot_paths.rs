use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use isig_atlas::adapters::series::markers;
use isig_atlas::braille::BrailleCanvas;
use isig_atlas::data::{Dataset, Record};
use isig_atlas::map::{cluster_markers, Viewport};
use isig_atlas::query::{self, AgeFilter, Criteria, YearSelection};

const CITIES: [(&str, f64, f64); 5] = [
    ("İstanbul", 41.01, 28.97),
    ("Ankara", 39.93, 32.85),
    ("İzmir", 38.42, 27.14),
    ("Konya", 37.87, 32.48),
    ("Gaziantep", 37.06, 37.38),
];

fn synthetic(n: usize) -> Dataset {
    let records = (0..n)
        .map(|i| {
            let (city, lat, lon) = CITIES[i % CITIES.len()];
            let jitter = (i % 97) as f64 * 0.01;
            Record {
                id: i.to_string(),
                person_name: Some(format!("İşçi {i}")),
                date: Some(format!("{:02}.{:02}.{}", i % 28 + 1, i % 12 + 1, 2023 + i % 3)),
                city: Some(city.to_string()),
                sector: Some(["İnşaat", "Tarım", "Madencilik"][i % 3].to_string()),
                age: Some((14 + i % 60) as f64),
                coords: Some(vec![lat + jitter, lon - jitter]),
                ..Default::default()
            }
        })
        .collect();
    Dataset::new(records)
}

fn bench_filter(c: &mut Criterion) {
    let dataset = synthetic(20_000);
    let criteria = Criteria {
        sector: Some("İnşaat".into()),
        age: AgeFilter::new(Some(18), Some(45)),
        year: YearSelection::Year(2024),
        ..Criteria::default()
    };
    c.bench_function("filter_20k", |b| {
        b.iter(|| query::apply(black_box(dataset.records()), black_box(&criteria)).len())
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let dataset = synthetic(20_000);
    c.bench_function("aggregate_20k", |b| {
        b.iter(|| {
            let records = black_box(dataset.records());
            (
                query::by_month(records).len(),
                query::by_sector(records).len(),
                query::by_age_bucket(records),
                query::by_year_month(records).len(),
            )
        })
    });
}

fn bench_cluster(c: &mut Criterion) {
    let dataset = synthetic(20_000);
    let indices: Vec<usize> = (0..dataset.len()).collect();
    let markers = markers(dataset.records(), &indices);
    let viewport = Viewport::turkey(400, 200);
    c.bench_function("cluster_20k", |b| {
        b.iter(|| cluster_markers(black_box(&markers), black_box(&viewport)).len())
    });
}

fn bench_canvas(c: &mut Criterion) {
    c.bench_function("canvas_fill_200x60", |b| {
        b.iter(|| {
            let mut canvas = BrailleCanvas::new(200, 60);
            for y in 0..240 {
                canvas.fill_span(y, 0, 399);
            }
            canvas.glyphs().count()
        })
    });
}

criterion_group!(benches, bench_filter, bench_aggregate, bench_cluster, bench_canvas);
criterion_main!(benches);
