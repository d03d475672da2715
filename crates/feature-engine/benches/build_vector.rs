use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{AliasTable, FeatureBuilder, PropertyRecord, Validator};

const LEGACY_SCHEMA: [&str; 14] = [
    "year_sold",
    "property_tax",
    "insurance",
    "beds",
    "baths",
    "soft",
    "year_built",
    "lot_size",
    "basement",
    "popular",
    "recession",
    "property_age",
    "property_type_Bunglow",
    "property_type_Condo",
];

fn bench_build(c: &mut Criterion) {
    let builder = FeatureBuilder::new(Validator::default(), AliasTable::with_known_variants());
    let record = PropertyRecord::default();

    c.bench_function("build_default", |b| {
        b.iter(|| builder.build_default(black_box(&record)))
    });

    c.bench_function("build_legacy_schema", |b| {
        b.iter(|| builder.build(black_box(&record), Some(&LEGACY_SCHEMA[..])))
    });
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
