use bb_core::engine::game::GamePlan;
use bb_core::season::schedule::round_robin;
use bb_core::season::scheduler::simulate_season;
use bb_core::{demo_league, EngineConfig, GameEngine};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn opening_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn bench_single_game(c: &mut Criterion) {
    let league = demo_league(2, 2024);
    let config = EngineConfig::default();
    let engine = GameEngine::new(&league.players, &config);
    let mut seed = 0u64;

    c.bench_function("single_game", |b| {
        b.iter(|| {
            seed += 1;
            let plan = GamePlan::standalone(&league, seed, opening_day(), seed, 1, 2).unwrap();
            black_box(engine.simulate(&plan))
        })
    });
}

fn bench_slate(c: &mut Criterion) {
    let league = demo_league(60, 2024);
    let ids: Vec<u32> = league.teams.iter().map(|t| t.id).collect();
    // First day of a 60-team round robin: 30 disjoint games.
    let slate: Vec<_> = round_robin(&ids, 1, opening_day()).into_iter().take(30).collect();

    let mut group = c.benchmark_group("slate_30");
    for parallel in [false, true] {
        let mut config = EngineConfig::default();
        config.scheduler.parallel_slates = parallel;
        config.scheduler.batch_size = 30;
        let name = if parallel { "parallel" } else { "sequential" };
        group.bench_function(name, |b| {
            b.iter(|| black_box(simulate_season(&league, &config, slate.clone(), 7).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_game, bench_slate);
criterion_main!(benches);
