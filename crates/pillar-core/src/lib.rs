//! # Pillar Core
//!
//! Dates and market conventions for the Pillar curve bootstrapping library.
//!
//! This crate provides the date arithmetic that rate helpers need to turn
//! market quotes into year fractions:
//!
//! - **Types**: `Date`, `Period`, `Frequency`, `Compounding`
//! - **Day Count Conventions**: ACT/360, ACT/365F, 30/360, ACT/ACT ISDA
//! - **Calendars**: weekend rules and business-day conventions
//! - **Schedules**: backward coupon schedule generation
//!
//! ## Example
//!
//! ```rust
//! use pillar_core::prelude::*;
//!
//! let trade = Date::from_ymd(2014, 10, 23).unwrap();
//! let spot = WeekendCalendar.add_business_days(trade, 2);
//! let maturity = WeekendCalendar
//!     .advance(spot, "6M".parse().unwrap(), BusinessDayConvention::ModifiedFollowing, false)
//!     .unwrap();
//! let tau = Act360.year_fraction_f64(spot, maturity);
//! assert!(tau > 0.5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::cast_possible_truncation)]

pub mod calendars;
pub mod daycounts;
pub mod error;
pub mod schedule;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calendars::{BusinessDayConvention, Calendar, NullCalendar, WeekendCalendar};
    pub use crate::daycounts::{
        Act360, Act365Fixed, ActActIsda, DayCount, DayCountConvention, Thirty360, Thirty360E,
    };
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::schedule::Schedule;
    pub use crate::types::{Compounding, Date, Frequency, Period, TimeUnit};
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use types::Date;
