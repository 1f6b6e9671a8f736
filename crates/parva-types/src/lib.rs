//! Core types for parva.

pub mod bs;
pub mod error;
pub mod festival;
pub mod lunar;
pub mod panchanga;
pub mod position;
pub mod time;

pub use bs::{BsDate, BsMonth, ConversionConfidence};
pub use error::{ErrorKind, ParvaError};
pub use festival::{MethodTag, OccurrenceConfidence, ResolvedOccurrence};
pub use lunar::{AdhikPolicy, LunarMonth, LunarYear, SankrantiEvent};
pub use panchanga::{Karana, Nakshatra, Paksha, Panchanga, Rashi, Tithi, UdayaTithi, Vaara, Yoga};
pub use position::{AngularPosition, Body, normalize_degrees, shortest_signed_difference};
pub use time::{GeoCoordinate, Instant, NEPAL_UTC_OFFSET_MINUTES, to_instant};
