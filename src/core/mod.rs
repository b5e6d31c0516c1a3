//! Core types shared by the scorer, aggregator and recommendation generator.

mod error;
mod observation;
mod principle;

pub use error::{Error, Result};
pub use observation::{ObservationValue, Observations};
pub use principle::{Principle, PrincipleSet, Profile};
