use super::amortization::schedule;
use super::error::{EngineError, EngineResult, require_non_negative};
use super::growth::{future_value, present_value};
use super::investment::{after_tax, investment_value};
use super::types::{ChartSeries, Dataset, PaymentDetail};

/// Upper bound on points in any generated series.
pub const MAX_CHART_POINTS: usize = 120;

/// Starting ages for the required-savings curve.
pub const COAST_AGE_GRID: [u32; 9] = [20, 25, 30, 35, 40, 45, 50, 55, 60];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Granularity {
    Monthly,
    Yearly,
}

/// Evenly spaced indices into `len` samples, always keeping the first and last.
pub fn decimate_indices(len: usize, max_points: usize) -> Vec<usize> {
    if len <= max_points {
        return (0..len).collect();
    }
    if max_points < 2 {
        return vec![0; max_points];
    }
    let span = len - 1;
    let steps = max_points - 1;
    (0..max_points)
        .map(|i| (i * span + steps / 2) / steps)
        .collect()
}

fn decimate<T: Copy>(samples: &[T]) -> Vec<T> {
    let indices = decimate_indices(samples.len(), MAX_CHART_POINTS);
    if indices.len() < samples.len() {
        tracing::debug!(
            from = samples.len(),
            to = indices.len(),
            "decimating chart series"
        );
    }
    indices.into_iter().map(|idx| samples[idx]).collect()
}

fn dataset(label: &str, data: Vec<f64>) -> Dataset {
    Dataset {
        label: label.to_string(),
        data,
    }
}

/// Yearly projected balance from `current_age` through `retirement_age` inclusive.
pub fn savings_projection(
    current_savings: f64,
    annual_rate: f64,
    current_age: u32,
    retirement_age: u32,
    target: f64,
) -> EngineResult<ChartSeries> {
    if retirement_age < current_age {
        return Err(EngineError::invalid(
            "retirement_age",
            format!("must be >= current age {current_age}, got {retirement_age}"),
        ));
    }
    let ages = decimate(&(current_age..=retirement_age).collect::<Vec<_>>());

    let mut projected = Vec::with_capacity(ages.len());
    for &age in &ages {
        projected.push(future_value(
            current_savings,
            annual_rate,
            (age - current_age) as f64,
        )?);
    }

    Ok(ChartSeries {
        labels: ages.iter().map(u32::to_string).collect(),
        datasets: vec![
            dataset("Projected savings", projected),
            dataset("Retirement target", vec![target; ages.len()]),
        ],
    })
}

/// Savings needed at each grid age to coast to `target` by `retirement_age`.
pub fn required_savings_by_age(
    target: f64,
    annual_rate: f64,
    retirement_age: u32,
) -> EngineResult<ChartSeries> {
    let ages = COAST_AGE_GRID
        .iter()
        .copied()
        .filter(|&age| age < retirement_age)
        .collect::<Vec<_>>();

    let mut required = Vec::with_capacity(ages.len());
    for &age in &ages {
        required.push(present_value(
            target,
            annual_rate,
            (retirement_age - age) as f64,
        )?);
    }

    Ok(ChartSeries {
        labels: ages.iter().map(u32::to_string).collect(),
        datasets: vec![dataset("Coast FIRE number", required)],
    })
}

fn balance_at(rows: &[PaymentDetail], starting_balance: f64, month: u32) -> f64 {
    if month == 0 {
        return starting_balance;
    }
    rows.get(month as usize - 1).map_or(0.0, |row| row.balance)
}

fn interest_at(rows: &[PaymentDetail], month: u32) -> f64 {
    if month == 0 {
        return 0.0;
    }
    rows.get(month as usize - 1)
        .or(rows.last())
        .map_or(0.0, |row| row.total_interest)
}

fn sample_months(horizon: u32, granularity: Granularity) -> Vec<u32> {
    match granularity {
        Granularity::Monthly => (0..=horizon).collect(),
        Granularity::Yearly => {
            let years = horizon.div_ceil(12);
            (0..=years).map(|year| (year * 12).min(horizon)).collect()
        }
    }
}

fn month_label(month: u32, granularity: Granularity) -> String {
    match granularity {
        Granularity::Monthly => format!("Month {month}"),
        Granularity::Yearly => format!("Year {}", month.div_ceil(12)),
    }
}

/// Balance and cumulative interest for the standard and accelerated payoff,
/// over the longer of the two durations.
pub fn balance_series(
    principal: f64,
    monthly_payment: f64,
    extra_monthly_payment: f64,
    lump_sum: f64,
    monthly_rate: f64,
    granularity: Granularity,
) -> EngineResult<ChartSeries> {
    require_non_negative("extra_monthly_payment", extra_monthly_payment)?;
    let standard = schedule(principal, monthly_payment, monthly_rate, 0.0)?;
    let accelerated = schedule(
        principal,
        monthly_payment + extra_monthly_payment,
        monthly_rate,
        lump_sum,
    )?;
    let horizon = standard.len().max(accelerated.len()) as u32;
    let months = decimate(&sample_months(horizon, granularity));
    let accelerated_start = (principal - lump_sum).max(0.0);

    let column = |f: &dyn Fn(u32) -> f64| months.iter().map(|&m| f(m)).collect::<Vec<_>>();

    Ok(ChartSeries {
        labels: months
            .iter()
            .map(|&month| month_label(month, granularity))
            .collect(),
        datasets: vec![
            dataset(
                "Standard balance",
                column(&|m| balance_at(&standard, principal, m)),
            ),
            dataset(
                "Accelerated balance",
                column(&|m| balance_at(&accelerated, accelerated_start, m)),
            ),
            dataset(
                "Standard interest paid",
                column(&|m| interest_at(&standard, m)),
            ),
            dataset(
                "Accelerated interest paid",
                column(&|m| interest_at(&accelerated, m)),
            ),
        ],
    })
}

/// Yearly after-tax gain from investing the extra payment and lump sum against
/// the interest saved by prepaying, up to the accelerated payoff horizon.
pub fn investment_vs_payoff(
    principal: f64,
    monthly_payment: f64,
    extra_monthly_payment: f64,
    lump_sum: f64,
    monthly_rate: f64,
    monthly_return_rate: f64,
    tax_rate: f64,
) -> EngineResult<ChartSeries> {
    let standard = schedule(principal, monthly_payment, monthly_rate, 0.0)?;
    let accelerated = schedule(
        principal,
        monthly_payment + extra_monthly_payment,
        monthly_rate,
        lump_sum,
    )?;
    let months = decimate(&sample_months(
        accelerated.len() as u32,
        Granularity::Yearly,
    ));

    let mut investment_gain = Vec::with_capacity(months.len());
    let mut interest_saved = Vec::with_capacity(months.len());
    for &month in &months {
        let pre_tax = investment_value(lump_sum, extra_monthly_payment, monthly_return_rate, month)?;
        let taxed = after_tax(pre_tax.gross_return, pre_tax.total_invested, tax_rate)?;
        investment_gain.push(taxed.net_return - taxed.total_invested);
        interest_saved.push(interest_at(&standard, month) - interest_at(&accelerated, month));
    }

    Ok(ChartSeries {
        labels: months
            .iter()
            .map(|&month| month_label(month, Granularity::Yearly))
            .collect(),
        datasets: vec![
            dataset("Investment gain (after tax)", investment_gain),
            dataset("Interest saved", interest_saved),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amortization::{monthly_rate, required_payment};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn thirty_year_loan() -> (f64, f64, f64) {
        let rate = monthly_rate(6.0).expect("valid");
        let payment = required_payment(200_000.0, rate, 360).expect("valid") + 0.01;
        (200_000.0, payment, rate)
    }

    #[test]
    fn decimate_indices_keeps_short_series_whole() {
        assert_eq!(decimate_indices(0, 120), Vec::<usize>::new());
        assert_eq!(decimate_indices(5, 120), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn decimate_indices_caps_long_series_and_keeps_endpoints() {
        let indices = decimate_indices(361, 120);
        assert_eq!(indices.len(), 120);
        assert_eq!(indices[0], 0);
        assert_eq!(indices[119], 360);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn savings_projection_runs_from_current_age_to_retirement_inclusive() {
        let series = savings_projection(50_000.0, 0.07, 30, 65, 1_000_000.0).expect("valid");
        assert!(series.is_aligned());
        assert_eq!(series.labels.len(), 36);
        assert_eq!(series.labels.first().map(String::as_str), Some("30"));
        assert_eq!(series.labels.last().map(String::as_str), Some("65"));

        let projected = &series.datasets[0].data;
        assert_eq!(projected[0], 50_000.0);
        assert_approx_tol(projected[35], 533_829.0, 1.0);
        assert!(series.datasets[1].data.iter().all(|&v| v == 1_000_000.0));
        assert!(savings_projection(50_000.0, 0.07, 40, 30, 1.0).is_err());
    }

    #[test]
    fn required_savings_uses_grid_ages_before_retirement() {
        let series = required_savings_by_age(1_000_000.0, 0.07, 50).expect("valid");
        assert_eq!(series.labels, vec!["20", "25", "30", "35", "40", "45"]);
        let required = &series.datasets[0].data;
        assert!(required.windows(2).all(|w| w[0] < w[1]));
        assert_approx_tol(required[2], 1_000_000.0 / 1.07_f64.powi(20), 1e-6);
    }

    #[test]
    fn monthly_balance_series_is_capped() {
        let (principal, payment, rate) = thirty_year_loan();
        let series =
            balance_series(principal, payment, 0.0, 0.0, rate, Granularity::Monthly).expect("valid");
        assert!(series.is_aligned());
        assert_eq!(series.labels.len(), MAX_CHART_POINTS);
        assert_eq!(series.labels[0], "Month 0");
        assert_eq!(series.datasets[0].data[0], principal);
        assert_eq!(*series.datasets[0].data.last().expect("points"), 0.0);
    }

    #[test]
    fn yearly_balance_series_spans_the_longer_payoff() {
        let (principal, payment, rate) = thirty_year_loan();
        let series = balance_series(principal, payment, 300.0, 10_000.0, rate, Granularity::Yearly)
            .expect("valid");
        assert!(series.is_aligned());
        assert_eq!(series.labels.len(), 31);
        assert_eq!(series.labels.last().map(String::as_str), Some("Year 30"));

        let accelerated = &series.datasets[1].data;
        assert_eq!(accelerated[0], 190_000.0);
        assert_eq!(*accelerated.last().expect("points"), 0.0);

        let standard_interest = &series.datasets[2].data;
        let accelerated_interest = &series.datasets[3].data;
        for (s, a) in standard_interest.iter().zip(accelerated_interest) {
            assert!(s + 1e-6 >= *a);
        }
    }

    #[test]
    fn balance_series_propagates_never_pays_off() {
        assert!(matches!(
            balance_series(200_000.0, 500.0, 0.0, 0.0, 0.005, Granularity::Yearly),
            Err(EngineError::NeverPaysOff { .. })
        ));
    }

    #[test]
    fn investment_vs_payoff_is_sampled_yearly_to_accelerated_horizon() {
        let (principal, payment, rate) = thirty_year_loan();
        let accelerated = schedule(principal, payment + 500.0, rate, 20_000.0).expect("valid");
        let series =
            investment_vs_payoff(principal, payment, 500.0, 20_000.0, rate, 0.07 / 12.0, 0.15)
                .expect("valid");

        assert!(series.is_aligned());
        assert_eq!(
            series.labels.len(),
            (accelerated.len() as u32).div_ceil(12) as usize + 1
        );
        let gain = &series.datasets[0].data;
        let saved = &series.datasets[1].data;
        assert_eq!(gain[0], 0.0);
        assert_eq!(saved[0], 0.0);
        assert!(gain.last().expect("points") > &0.0);
        assert!(saved.last().expect("points") > &0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_decimate_indices_is_bounded_and_increasing(
            len in 0usize..5_000,
            max_points in 2usize..400
        ) {
            let indices = decimate_indices(len, max_points);
            prop_assert_eq!(indices.len(), len.min(max_points));
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
            if len > 0 {
                prop_assert_eq!(indices[0], 0);
                prop_assert_eq!(*indices.last().expect("non-empty"), len - 1);
            }
        }
    }
}
