use std::path::PathBuf;

use foliar::{
    engine::{Engine, EngineBuilder, EngineSettings},
    lesion::Stage,
    scenario::{Scenario, ScenarioLoader},
    systems::{
        AllocationSystem, BookkeepingSystem, ClimateSystem, DevelopmentSystem, EmissionSystem,
        InfectionSystem,
    },
};

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn load_scenario() -> Scenario {
    scenario_loader()
        .load("scenarios/septoria_patch.yaml")
        .expect("scenario loads")
}

fn build_engine(scenario: &Scenario) -> Engine {
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: 0,
        snapshot_dir: PathBuf::from("snapshots_test"),
    };
    EngineBuilder::new(settings)
        .with_system(ClimateSystem::new(
            scenario.weather.clone(),
            scenario.senescence.clone(),
        ))
        .with_system(InfectionSystem::new(scenario.surface_model))
        .with_system(DevelopmentSystem::new())
        .with_system(AllocationSystem::new(scenario.growth_policy.build()))
        .with_system(EmissionSystem::new())
        .with_system(BookkeepingSystem::new())
        .build()
}

fn total_emitted(canopy: &foliar::canopy::Canopy) -> f64 {
    canopy
        .sectors
        .iter()
        .flat_map(|s| s.lesions.iter())
        .map(|l| l.spores_emitted())
        .sum()
}

#[test]
fn no_emission_before_the_first_rain() {
    let scenario = load_scenario();
    let mut canopy = scenario.build_canopy();
    let mut engine = build_engine(&scenario);
    engine.run(&mut canopy, 399).expect("run succeeds");

    assert_eq!(total_emitted(&canopy), 0.0);
    assert_eq!(
        canopy.viable_units(),
        0,
        "the starting inoculum converted long ago and nothing reseeded"
    );
    for sector in &canopy.sectors {
        assert_eq!(sector.stage_area(Stage::Empty), 0.0);
    }
}

#[test]
fn rain_events_emit_and_reseed() {
    let scenario = load_scenario();
    let mut canopy = scenario.build_canopy();
    let mut engine = build_engine(&scenario);
    // Covers the rain pulses at ticks 400 and 500.
    engine.run(&mut canopy, 505).expect("run succeeds");

    assert!(
        total_emitted(&canopy) > 0.0,
        "sporulating lesions must answer the tick-400 rain"
    );
    let empty: f64 = canopy
        .sectors
        .iter()
        .map(|s| s.stage_area(Stage::Empty))
        .sum();
    assert!(empty > 0.0, "emission retires sporulating surface");
    assert!(
        canopy.viable_units() > 0,
        "units from the tick-500 rain are still inside their window"
    );
    let lesions: usize = canopy.sectors.iter().map(|s| s.lesions.len()).sum();
    assert!(
        lesions > 20,
        "the tick-400 generation converts by tick 505, got {lesions}"
    );
}
