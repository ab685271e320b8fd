mod allocation;
mod bookkeeping;
mod climate;
mod development;
mod emission;
mod infection;

pub use allocation::AllocationSystem;
pub use bookkeeping::BookkeepingSystem;
pub use climate::ClimateSystem;
pub use development::DevelopmentSystem;
pub use emission::EmissionSystem;
pub use infection::InfectionSystem;
