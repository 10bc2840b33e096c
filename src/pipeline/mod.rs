//! Pipeline module - cleaning, derivation, cohort selection and model fitting

pub mod analysis;
pub mod cohort;
pub mod derive;
pub mod describe;
pub mod error;
pub mod loader;
pub mod logit;
pub mod missing;

pub use analysis::*;
pub use cohort::*;
pub use derive::*;
pub use describe::*;
pub use error::AnalysisError;
pub use loader::*;
pub use logit::*;
pub use missing::*;
