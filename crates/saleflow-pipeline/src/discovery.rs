//! Earliest-available-date search over the upstream API.
//!
//! Availability is assumed monotonic: once a date has data, every later date
//! has data too. The search relies on that and does not check it.

use chrono::{Days, NaiveDate};
use saleflow_types::{DateRangeError, Result, SaleflowError};
use tracing::{debug, info};

use crate::collaborators::AvailabilityProbe;

/// Distance of each backwards step while looking for a date with data.
pub const STEP_BACK_DAYS: u64 = 365;

/// Finds the earliest date in `[floor, today]` that has data.
///
/// First steps back from `today` a year at a time (never below `floor`)
/// until a date with data is found, then bisects between `floor` and that
/// date.
///
/// # Errors
///
/// Returns [`SaleflowError::DateRange`] if `today` is before `floor`, and
/// [`SaleflowError::NoDataAvailable`] if the floor itself has no data.
pub async fn discover_first_available_date<P>(
    probe: &P,
    floor: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate>
where
    P: AvailabilityProbe + ?Sized,
{
    if today < floor {
        return Err(DateRangeError::InvalidRange {
            start: floor,
            end: today,
        }
        .into());
    }

    info!(%floor, %today, "searching for first available date");

    let mut right = today;
    loop {
        debug!(date = %right, "probing right bound");
        if probe.has_data(right).await {
            break;
        }
        if right == floor {
            return Err(SaleflowError::NoDataAvailable { floor });
        }
        right = right
            .checked_sub_days(Days::new(STEP_BACK_DAYS))
            .map_or(floor, |d| d.max(floor));
    }
    info!(date = %right, "found date with data");

    let mut left = floor;
    while left < right {
        let half = (right - left).num_days() / 2;
        let mid = left
            .checked_add_days(Days::new(half.unsigned_abs()))
            .unwrap_or(right);
        debug!(%left, %right, %mid, "bisecting");

        if probe.has_data(mid).await {
            right = mid;
        } else {
            left = mid.succ_opt().unwrap_or(right);
        }
    }

    info!(date = %left, "first available date");
    Ok(left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Reports data on and after `first`, or never if `first` is `None`.
    struct FakeProbe {
        first: Option<NaiveDate>,
        probes: Mutex<Vec<NaiveDate>>,
    }

    impl FakeProbe {
        fn starting(first: NaiveDate) -> Self {
            Self {
                first: Some(first),
                probes: Mutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self {
                first: None,
                probes: Mutex::new(Vec::new()),
            }
        }

        fn probes(&self) -> Vec<NaiveDate> {
            self.probes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AvailabilityProbe for FakeProbe {
        async fn has_data(&self, date: NaiveDate) -> bool {
            self.probes.lock().unwrap().push(date);
            self.first.is_some_and(|first| date >= first)
        }
    }

    #[tokio::test]
    async fn test_finds_first_date_in_history() {
        let probe = FakeProbe::starting(date(2022, 3, 10));

        let found = discover_first_available_date(&probe, date(2020, 1, 1), date(2024, 6, 1))
            .await
            .unwrap();

        assert_eq!(found, date(2022, 3, 10));
    }

    #[tokio::test]
    async fn test_probes_stay_within_floor_and_today() {
        let floor = date(2020, 1, 1);
        let today = date(2024, 6, 1);
        let probe = FakeProbe::starting(date(2022, 3, 10));

        discover_first_available_date(&probe, floor, today)
            .await
            .unwrap();

        assert!(probe.probes().iter().all(|d| *d >= floor && *d <= today));
        // Today has data, so the first probe settles the right bound.
        assert_eq!(probe.probes()[0], today);
    }

    #[tokio::test]
    async fn test_right_bound_walks_back_a_year_at_a_time() {
        // Data only exists in a window ending before today, which breaks the
        // monotonic assumption but exercises the step-back path.
        struct Window;

        #[async_trait]
        impl AvailabilityProbe for Window {
            async fn has_data(&self, date: NaiveDate) -> bool {
                date >= NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
                    && date <= NaiveDate::from_ymd_opt(2022, 12, 31).unwrap()
            }
        }

        let found = discover_first_available_date(&Window, date(2020, 1, 1), date(2024, 6, 1))
            .await
            .unwrap();

        assert_eq!(found, date(2021, 1, 1));
    }

    #[tokio::test]
    async fn test_data_before_floor_returns_floor() {
        let floor = date(2020, 1, 1);
        let probe = FakeProbe::starting(date(2018, 5, 5));

        let found = discover_first_available_date(&probe, floor, date(2024, 6, 1))
            .await
            .unwrap();

        assert_eq!(found, floor);
    }

    #[tokio::test]
    async fn test_no_data_anywhere_stops_at_floor() {
        let floor = date(2020, 1, 1);
        let today = date(2024, 6, 1);
        let probe = FakeProbe::empty();

        let err = discover_first_available_date(&probe, floor, today)
            .await
            .unwrap_err();

        assert!(matches!(err, SaleflowError::NoDataAvailable { floor: f } if f == floor));
        let probes = probe.probes();
        assert_eq!(probes.first(), Some(&today));
        assert_eq!(probes.last(), Some(&floor));
        assert!(probes.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn test_today_equals_floor() {
        let day = date(2024, 6, 1);

        let found = discover_first_available_date(&FakeProbe::starting(day), day, day)
            .await
            .unwrap();
        assert_eq!(found, day);

        let err = discover_first_available_date(&FakeProbe::empty(), day, day)
            .await
            .unwrap_err();
        assert!(matches!(err, SaleflowError::NoDataAvailable { .. }));
    }

    #[tokio::test]
    async fn test_today_before_floor_is_invalid() {
        let err = discover_first_available_date(
            &FakeProbe::empty(),
            date(2024, 6, 2),
            date(2024, 6, 1),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SaleflowError::DateRange(_)));
    }

    #[tokio::test]
    async fn test_boundary_property_over_many_first_dates() {
        let floor = date(2020, 1, 1);
        let today = date(2024, 6, 1);
        let mut first = floor;

        while first <= today {
            let probe = FakeProbe::starting(first);
            let found = discover_first_available_date(&probe, floor, today)
                .await
                .unwrap();

            assert_eq!(found, first);
            assert!(probe.has_data(found).await);
            if found > floor {
                assert!(!probe.has_data(found.pred_opt().unwrap()).await);
            }
            first = first.checked_add_days(Days::new(37)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_probe_count_is_logarithmic() {
        let probe = FakeProbe::starting(date(2022, 3, 10));

        discover_first_available_date(&probe, date(2020, 1, 1), date(2024, 6, 1))
            .await
            .unwrap();

        // One right-bound probe plus about log2(1613) bisection probes.
        assert!(probe.probes().len() <= 13);
    }
}
