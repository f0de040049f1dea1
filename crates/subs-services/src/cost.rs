//! Cost calculation
//!
//! Computes how much a subscription bills inside a query window. The window
//! is intersected with the subscription's own lifetime and the result is
//! counted in whole months.

use chrono::NaiveDate;
use subs_core::dates::{earlier_of, later_of, months_between};
use subs_core::models::Subscription;

/// Stateless cost calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct CostCalculator;

impl CostCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Billed months of `sub` inside `[window_start, window_end]`
    ///
    /// Returns zero when the subscription lies entirely outside the window.
    pub fn billed_months(
        &self,
        sub: &Subscription,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> i64 {
        let effective_start = later_of(window_start, sub.start_date);
        let effective_end = match sub.end_date {
            Some(end) => earlier_of(window_end, end),
            None => window_end,
        };

        if effective_start > effective_end {
            return 0;
        }

        months_between(effective_start, effective_end)
    }

    /// Cost of one subscription inside the window
    pub fn cost(&self, sub: &Subscription, window_start: NaiveDate, window_end: NaiveDate) -> i64 {
        self.billed_months(sub, window_start, window_end)
            .saturating_mul(sub.price)
    }

    /// Sum of [`cost`](Self::cost) over a set of subscriptions
    pub fn total_cost<'a, I>(&self, subs: I, window_start: NaiveDate, window_end: NaiveDate) -> i64
    where
        I: IntoIterator<Item = &'a Subscription>,
    {
        subs.into_iter()
            .map(|sub| self.cost(sub, window_start, window_end))
            .fold(0i64, i64::saturating_add)
    }
}
