//! # Ritel Segar
//!
//! Workspace facade for the fresh-retail sales forecasting tools.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use ritel_segar_workspace::{DateRange, FeatureBuilder};
//!
//! let range = DateRange::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
//! )
//! .unwrap();
//! let rows = FeatureBuilder::build(&range).unwrap();
//! assert_eq!(rows.len(), 7);
//! assert_eq!(rows[0].day_of_week, 0); // Monday
//! ```

pub use sales_forecast::*;
