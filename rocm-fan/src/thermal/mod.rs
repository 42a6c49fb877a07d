mod config;
mod controller;
mod state;

pub use config::FanCurve;
pub use controller::{Evaluation, RampPoint, SpeedController, SpeedDecision};
pub use state::CoolingRegime;
