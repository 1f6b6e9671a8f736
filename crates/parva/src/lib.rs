//! # Parva
//!
//! Nepali lunisolar almanac: panchanga at sunrise, Bikram Sambat conversion,
//! lunar months with Adhik Maas detection, and festival date resolution.
//!
//! This crate is a facade that re-exports functionality from the `parva`
//! workspace.
//!
//! ## Modules
//!
//! - `types`: data model and the shared error type
//! - `astronomy`: position provider, boundary solver, tithi, panchanga, sankranti
//! - `calendar`: Bikram Sambat converter and lunar month constructor
//! - `rules`: festival rule catalog and execution engine
//!
//! ## Usage
//!
//! ```no_run
//! use parva::prelude::*;
//! use chrono::NaiveDate;
//!
//! let parva = Parva::new()?;
//! let date = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
//! let (bs, confidence) = parva.convert_gregorian_to_bs(date)?;
//! assert_eq!(bs.to_string(), "2082-11-03");
//! assert!(confidence.is_official());
//!
//! let dashain = parva.resolve_festival("dashain", 2025)?;
//! println!("{}", dashain);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use parva_core::*;
