//! Testability - weighted testability scoring for web page observations.
//!
//! A browser-automation collector turns a page into a flat bag of named
//! observations (element counts, storage flags, timings). This library maps
//! that bag onto ten testability principles through a declarative rule
//! table, averages the principle scores into an overall score and grade, and
//! produces prioritized recommendations for every principle that falls below
//! the acceptable threshold.
//!
//! # Example
//!
//! ```
//! use testability::assessment::Assessor;
//! use testability::core::Observations;
//!
//! let observations = Observations::new()
//!     .with_count("dataTestAttributeCount", 12.0)
//!     .with_flag("hasLocalStorageData", true)
//!     .with_count("consoleErrorCount", 0.0);
//!
//! let assessment = Assessor::default().assess(Some("guest"), &observations).unwrap();
//! println!("{} ({})", assessment.result.overall_score, assessment.result.grade);
//! for rec in &assessment.recommendations {
//!     println!("[{}] {}: {}", rec.priority, rec.principle, rec.advice);
//! }
//! ```

pub mod assessment;
pub mod cli;
pub mod config;
pub mod core;
pub mod output;
pub mod score;

pub use assessment::{Assessment, Assessor};
pub use core::{Error, Observations, Principle, Result};
