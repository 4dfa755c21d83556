//! Forward rate agreement helper.

use pillar_core::daycounts::{DayCount, DayCountConvention};
use pillar_core::types::Period;
use pillar_core::Date;

use super::{accrual, simple_forward, HelperCurves, InstrumentType, RateHelper};
use crate::conventions::IndexConventions;
use crate::error::{CurveError, CurveResult};
use crate::multicurve::{CurveLookup, CurveSource};
use crate::quote::Quote;

/// Forward rate agreement on an index period.
///
/// Priced like a forward-starting deposit:
///
/// ```text
/// rate = (DF(start) / DF(end) - 1) / τ(start, end)
/// ```
#[derive(Debug, Clone)]
pub struct FraHelper {
    quote: Quote,
    start: Date,
    end: Date,
    day_count: DayCountConvention,
    curves: HelperCurves,
    label: String,
}

impl FraHelper {
    /// Creates a FRA accruing ACT/360 from `start` to `end`.
    pub fn new(quote: impl Into<Quote>, start: Date, end: Date) -> CurveResult<Self> {
        if end <= start {
            return Err(CurveError::invalid_config(format!(
                "FRA end {end} is not after start {start}"
            )));
        }
        Ok(Self {
            quote: quote.into(),
            start,
            end,
            day_count: DayCountConvention::Act360,
            curves: HelperCurves::attached(),
            label: format!("FRA {start}/{end}"),
        })
    }

    /// Creates an `m x (m + tenor)` FRA on `index`, e.g. 3x9 on 6M Euribor.
    pub fn from_months(
        quote: impl Into<Quote>,
        trade_date: Date,
        months_to_start: u32,
        index: &IndexConventions,
    ) -> CurveResult<Self> {
        let spot = index.spot_date(trade_date)?;
        let start = index.advance(spot, Period::months(months_to_start as i32))?;
        let end = index.maturity_date(start)?;
        let mut helper = Self::new(quote, start, end)?.with_day_count(index.day_count);
        let months_to_end = index
            .tenor
            .in_months()
            .map_or_else(|| index.tenor.to_string(), |m| (m + months_to_start as i32).to_string());
        helper.label = format!("{months_to_start}x{months_to_end} FRA");
        Ok(helper)
    }

    /// Sets the accrual day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Projects the rate on another curve.
    #[must_use]
    pub fn with_forecast_curve(mut self, source: CurveSource) -> Self {
        self.curves.set_forecast(source);
        self
    }

    /// Start of the forward period.
    #[must_use]
    pub fn start_date(&self) -> Date {
        self.start
    }

    /// Accrual year fraction.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        self.day_count.year_fraction_f64(self.start, self.end)
    }
}

impl RateHelper for FraHelper {
    fn quote(&self) -> &Quote {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start
    }

    fn maturity_date(&self) -> Date {
        self.end
    }

    fn implied_quote(&self, curves: &dyn CurveLookup) -> CurveResult<f64> {
        let curve = self.curves.forecast_curve(curves, &self.label)?;
        let tau = accrual(self.day_count, self.start, self.end, &self.label)?;
        simple_forward(curve, self.start, self.end, tau)
    }

    fn implied_discount_guess(&self, curves: &dyn CurveLookup, quote: f64) -> Option<f64> {
        if !self.curves.forecasts_on_attached() {
            return None;
        }
        let curve = self.curves.forecast_curve(curves, &self.label).ok()?;
        let df_start = curve.discount_at(self.start).ok()?;
        Some(df_start / (1.0 + quote * self.year_fraction()))
    }

    fn curves(&self) -> &HelperCurves {
        &self.curves
    }

    fn curves_mut(&mut self) -> &mut HelperCurves {
        &mut self.curves
    }

    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Fra
    }

    fn description(&self) -> String {
        self.label.clone()
    }
}
