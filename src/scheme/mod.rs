//! Scheme parameters and input loading

mod params;
pub mod loader;

pub use params::{SchemeParameters, CommissionType};
pub use loader::{load_schemes, load_schemes_from_reader, load_scheme_json};
