pub mod canopy;
pub mod dispersal;
pub mod engine;
pub mod fungus;
pub mod growth;
pub mod leaf;
pub mod lesion;
pub mod outputs;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod weather;

pub use engine::{Engine, EngineBuilder, EngineSettings, TickSummary};
pub use scenario::Scenario;
