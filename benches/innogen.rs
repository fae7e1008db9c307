use clade::{random::default_rng, InnoGen};
use criterion::Criterion;
use rand::Rng;

fn bench_innogen(bench: &mut Criterion) {
    let mut rng = default_rng();
    let mut inno = InnoGen::new();
    let nodes = (0..10_000)
        .map(|i| inno.new_node(i as f64 / 10_000., 0.5))
        .collect::<Vec<_>>();

    bench.bench_function("innogen-connection", |b| {
        b.iter(|| {
            let from = &nodes[rng.random_range(0..nodes.len())];
            let to = &nodes[rng.random_range(0..nodes.len())];
            inno.connection(from, to)
        })
    });

    bench.bench_function("innogen-replace-index", |b| {
        b.iter(|| {
            inno.replace_index(
                rng.random_range(1..=10_000),
                rng.random_range(1..=10_000),
            )
        })
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(2000)
        .significance_level(0.1);
    #[cfg(feature = "smol_bench")]
    let mut criterion: criterion::Criterion<_> = {
        use core::time::Duration;
        Criterion::default()
            .measurement_time(Duration::from_millis(1))
            .sample_size(10)
            .nresamples(1)
            .without_plots()
            .configure_from_args()
    };
    bench_innogen(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
