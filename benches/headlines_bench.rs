use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nu_plugin_headlines::algo::kmeans::{kmeans, KMeansParams};
use nu_plugin_headlines::algo::tfidf::{vectorize, VectorizerConfig};
use nu_plugin_headlines::algo::{elbow, normalize};
use nu_plugin_headlines::{cluster_articles, ClusterConfig, ClusterCount, Record};

/// Generate synthetic headlines for benchmarking
fn generate_records(n: usize) -> Vec<Record> {
    let topics = [
        ("central bank raises interest rates", "inflation markets bonds", "economy"),
        ("storm floods coastal towns", "evacuation rain weather warning", "weather"),
        ("football league final result", "champions goal stadium fans", "sport"),
        ("new smartphone chip announced", "processor battery camera launch", "tech"),
        ("election campaign enters final week", "polls candidates debate voters", "politics"),
        ("oil prices climb after supply cut", "crude opec exports energy", "energy"),
        ("vaccine trial shows strong results", "hospital patients health study", "health"),
        ("film festival opens with premiere", "director actors award cinema", "culture"),
    ];
    (0..n)
        .map(|i| {
            let (title, desc, label) = topics[i % topics.len()];
            Record::new(format!("{title} {i}"), format!("{desc} report-{}", i % 50))
                .with_labels(vec![label])
        })
        .collect()
}

fn texts(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| normalize::normalize(&format!("{} {} {}", r.title, r.title, r.description)))
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let text = "Central Bank RAISES interest rates, again! (Reuters) - markets react.";
    c.bench_function("normalize/single", |b| {
        b.iter(|| normalize::normalize(black_box(text)))
    });
}

fn bench_vectorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorize");
    let config = VectorizerConfig::default();
    for size in [100, 1000, 5000] {
        let docs = texts(&generate_records(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &docs, |b, docs| {
            b.iter(|| black_box(vectorize(docs, &config)))
        });
    }
    group.finish();
}

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");
    group.sample_size(20);
    let params = KMeansParams::default();
    for size in [100, 1000] {
        let docs = texts(&generate_records(size));
        let Ok(matrix) = vectorize(&docs, &VectorizerConfig::default()) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(size), &matrix, |b, m| {
            b.iter(|| black_box(kmeans(m, 8, &params)))
        });
    }
    group.finish();
}

fn bench_elbow(c: &mut Criterion) {
    let docs = texts(&generate_records(500));
    let Ok(matrix) = vectorize(&docs, &VectorizerConfig::default()) else {
        return;
    };
    let params = KMeansParams::default();
    c.bench_function("elbow/500_items", |b| {
        b.iter(|| black_box(elbow::select_k(&matrix, 10, &params)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_articles");
    group.sample_size(10);
    let records = generate_records(1000);
    for (name, count) in [("fixed_8", ClusterCount::Fixed(8)), ("auto", ClusterCount::Auto)] {
        let config = ClusterConfig {
            cluster_count: count,
            use_labels: true,
            ..Default::default()
        };
        group.bench_function(name, |b| {
            b.iter(|| black_box(cluster_articles(&records, &config)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_vectorize,
    bench_kmeans,
    bench_elbow,
    bench_pipeline,
);
criterion_main!(benches);
