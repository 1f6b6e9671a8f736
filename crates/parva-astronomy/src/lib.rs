//! Astronomy for parva.
//!
//! Everything here is a pure function of a [`PositionProvider`]: sunrise,
//! the boundary solver, the five panchanga limbs and solar ingresses.

pub mod ayanamsa;
pub mod coords;
pub mod panchanga;
pub mod provider;
pub mod sankranti;
pub mod sky;
pub mod solver;
pub mod sunrise;
pub mod tithi;
pub mod time;

pub use ayanamsa::Ayanamsa;
pub use panchanga::compute_panchanga;
pub use provider::{AnalyticEphemeris, PositionProvider};
pub use sankranti::{
    find_sankranti, makara_sankranti, mesh_sankranti, next_sankranti, sankrantis_between, sankrantis_in_year,
};
pub use sky::Sky;
pub use solver::{BoundarySolver, Direction, find_crossing};
pub use tithi::{TithiDay, find_next_tithi, tithi_at, tithi_bounds, tithi_in_window, udaya_tithi};
