//! Calendars for parva: Bikram Sambat and the lunar months.

pub mod bs;
pub mod lunar;
pub mod table;

pub use bs::{BsConverter, DEFAULT_ESTIMATED_SPAN_YEARS, ESTIMATED_ERROR_BOUND_DAYS};
pub use lunar::{adhik_months, build_month, find_amavasya, find_purnima, lunar_month_at, lunar_year, months_between};
pub use table::{BsCalendarTable, BsYear};
