use std::path::PathBuf;

use foliar::{
    engine::{EngineBuilder, EngineSettings},
    scenario::{Scenario, ScenarioLoader},
    systems::{
        AllocationSystem, BookkeepingSystem, ClimateSystem, DevelopmentSystem, EmissionSystem,
        InfectionSystem,
    },
};
use tempfile::tempdir;

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn build_engine(scenario: &Scenario) -> EngineBuilder {
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
}

#[test]
fn units_wait_out_the_observation_window() {
    let scenario = scenario_loader()
        .load("scenarios/septoria_patch.yaml")
        .expect("scenario loads");
    let mut canopy = scenario.build_canopy();
    let mut engine = build_engine(&scenario).build();
    engine.run(&mut canopy, 10).expect("run succeeds");

    assert_eq!(
        canopy.viable_units(),
        20,
        "no unit may resolve before its observation window is full"
    );
    for sector in &canopy.sectors {
        assert!(sector.lesions.is_empty(), "no lesion before the window");
    }
}

#[test]
fn wet_warm_weather_converts_every_unit() {
    let scenario = scenario_loader()
        .load("scenarios/septoria_patch.yaml")
        .expect("scenario loads");
    let mut canopy = scenario.build_canopy();
    let mut engine = build_engine(&scenario).build();
    engine.run(&mut canopy, 120).expect("run succeeds");

    assert_eq!(canopy.sectors[0].lesions.len(), 12);
    assert_eq!(canopy.sectors[1].lesions.len(), 8);
    assert_eq!(
        canopy.viable_units(),
        0,
        "constant wetness leaves no unit waiting"
    );
    for sector in &canopy.sectors {
        assert!(sector.lesions.iter().all(|l| l.is_active()));
    }
}

const DROUGHT: &str = r#"
name: drought
seed: 13
fungus: septoria
weather:
  base_temp_c: 22.0
  relative_humidity: 40.0
  wet: false
sectors:
  - area: 10.0
    length: 12.0
    inoculum:
      units: 9
      spores_per_unit: 5
"#;

#[test]
fn dry_weather_loses_units_instead() {
    let temp = tempdir().expect("tempdir");
    std::fs::write(temp.path().join("drought.yaml"), DROUGHT).expect("write scenario");
    let scenario = ScenarioLoader::new(temp.path())
        .load("drought.yaml")
        .expect("scenario loads");
    let mut canopy = scenario.build_canopy();
    let mut engine = build_engine(&scenario).build();
    engine.run(&mut canopy, 130).expect("run succeeds");

    assert_eq!(
        canopy.viable_units(),
        0,
        "120 dry hours kill every unit with certainty"
    );
    assert!(canopy.sectors[0].dispersal_units.is_empty());
    assert!(canopy.sectors[0].lesions.is_empty(), "nothing infects dry");
}
