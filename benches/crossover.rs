use clade::{genome::MutationMode, random::default_rng, Config, Genome, InnoGen};
use core::cmp::Ordering;
use criterion::Criterion;

/// Two genomes grown apart from the same 8 -> 4 ancestor
fn grown_pair(generations: usize) -> (Genome, Genome) {
    let mut rng = default_rng();
    let config = Config::default();
    let mut inno = InnoGen::new();
    let mut nodes = Vec::with_capacity(12);
    for i in 0..8 {
        nodes.push(inno.new_node(0.01, (i + 1) as f64 / 9.));
    }
    for i in 0..4 {
        nodes.push(inno.new_node(0.99, (i + 1) as f64 / 5.));
    }

    let mut l = Genome::with_nodes(nodes);
    let mut r = l.clone();
    for _ in 0..generations {
        l.mutate(MutationMode::default(), &mut inno, &config, &mut rng)
            .unwrap();
        r.mutate(MutationMode::default(), &mut inno, &config, &mut rng)
            .unwrap();
    }
    (l, r)
}

fn bench_crossover(bench: &mut Criterion) {
    let (l, r) = grown_pair(200);
    let config = Config::default();
    let mut rng = default_rng();

    bench.bench_function("crossover-ne", |b| {
        b.iter(|| l.crossover(&r, Ordering::Greater, false, &config, &mut rng))
    });

    bench.bench_function("crossover-eq", |b| {
        b.iter(|| l.crossover(&r, Ordering::Equal, false, &config, &mut rng))
    });

    bench.bench_function("crossover-optimize", |b| {
        b.iter(|| l.crossover(&r, Ordering::Greater, true, &config, &mut rng))
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(1000)
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
    bench_crossover(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
