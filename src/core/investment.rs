use super::error::{EngineResult, require_finite, require_fraction, require_non_negative, require_rate};
use super::types::{InvestmentResult, PayoffComparison, Strategy, StrategyComparison};

/// Lump sum plus an end-of-month contribution stream, before tax.
pub fn investment_value(
    lump_sum: f64,
    monthly_contribution: f64,
    monthly_return_rate: f64,
    months: u32,
) -> EngineResult<InvestmentResult> {
    require_non_negative("lump_sum", lump_sum)?;
    require_non_negative("monthly_contribution", monthly_contribution)?;
    require_rate("monthly_return_rate", monthly_return_rate)?;

    let n = months as f64;
    let growth = (1.0 + monthly_return_rate).powf(n);
    let lump_value = if months == 0 { lump_sum } else { lump_sum * growth };
    let contribution_value = if monthly_return_rate == 0.0 {
        monthly_contribution * n
    } else {
        monthly_contribution * (growth - 1.0) / monthly_return_rate
    };

    let gross_return = lump_value + contribution_value;
    let total_invested = lump_sum + monthly_contribution * n;
    let profit = (gross_return - total_invested).max(0.0);

    Ok(InvestmentResult {
        gross_return,
        profit,
        taxes: 0.0,
        net_return: gross_return,
        total_invested,
    })
}

/// Flat capital-gains tax on profit only; principal is never taxed.
pub fn after_tax(gross_return: f64, total_invested: f64, tax_rate: f64) -> EngineResult<InvestmentResult> {
    require_non_negative("gross_return", gross_return)?;
    require_non_negative("total_invested", total_invested)?;
    require_fraction("tax_rate", tax_rate)?;

    let profit = (gross_return - total_invested).max(0.0);
    let taxes = profit * tax_rate;
    Ok(InvestmentResult {
        gross_return,
        profit,
        taxes,
        net_return: gross_return - taxes,
        total_invested,
    })
}

/// Ties favour paying the loan down.
pub fn better_strategy(interest_saved: f64, investment_net_benefit: f64) -> Strategy {
    if investment_net_benefit > interest_saved {
        Strategy::Invest
    } else {
        Strategy::Payoff
    }
}

/// Invests the extra payment and lump sum instead, over the accelerated payoff
/// horizon, and weighs the after-tax gain against the interest saved.
pub fn compare_strategies(
    payoff: &PayoffComparison,
    extra_monthly_payment: f64,
    lump_sum: f64,
    monthly_return_rate: f64,
    tax_rate: f64,
) -> EngineResult<StrategyComparison> {
    require_finite("interest_saved", payoff.interest_saved)?;
    let pre_tax = investment_value(
        lump_sum,
        extra_monthly_payment,
        monthly_return_rate,
        payoff.accelerated.months,
    )?;
    let investment = after_tax(pre_tax.gross_return, pre_tax.total_invested, tax_rate)?;
    let net_benefit = investment.net_return - investment.total_invested;

    Ok(StrategyComparison {
        interest_saved: payoff.interest_saved,
        investment,
        net_benefit,
        recommendation: better_strategy(payoff.interest_saved, net_benefit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PayoffResult;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn comparison_with(months: u32, interest_saved: f64) -> PayoffComparison {
        let accelerated = PayoffResult {
            months,
            total_interest: 50_000.0,
            total_payments: 250_000.0,
        };
        PayoffComparison {
            standard: PayoffResult {
                months: months + 60,
                total_interest: 50_000.0 + interest_saved,
                total_payments: 250_000.0 + interest_saved,
            },
            accelerated,
            interest_saved,
            months_saved: 60,
        }
    }

    #[test]
    fn zero_rate_investment_is_just_the_contributions() {
        let result = investment_value(1_000.0, 100.0, 0.0, 24).expect("valid");
        assert_approx_tol(result.gross_return, 3_400.0, 1e-9);
        assert_approx_tol(result.total_invested, 3_400.0, 1e-9);
        assert_eq!(result.profit, 0.0);
        assert_eq!(result.taxes, 0.0);
    }

    #[test]
    fn investment_value_uses_ordinary_annuity() {
        let r = 0.005;
        let result = investment_value(10_000.0, 200.0, r, 120).expect("valid");
        let growth = 1.005_f64.powi(120);
        let expected = 10_000.0 * growth + 200.0 * (growth - 1.0) / r;
        assert_approx_tol(result.gross_return, expected, 1e-6);
        assert_approx_tol(result.total_invested, 34_000.0, 1e-9);
        assert_approx_tol(result.profit, expected - 34_000.0, 1e-6);
        assert_eq!(result.net_return, result.gross_return);
    }

    #[test]
    fn zero_months_returns_the_lump_sum() {
        let result = investment_value(5_000.0, 300.0, 0.01, 0).expect("valid");
        assert_eq!(result.gross_return, 5_000.0);
        assert_eq!(result.total_invested, 5_000.0);
    }

    #[test]
    fn after_tax_only_taxes_profit() {
        let result = after_tax(150_000.0, 100_000.0, 0.15).expect("valid");
        assert_approx_tol(result.profit, 50_000.0, 1e-9);
        assert_approx_tol(result.taxes, 7_500.0, 1e-9);
        assert_approx_tol(result.net_return, 142_500.0, 1e-9);

        let loss = after_tax(90_000.0, 100_000.0, 0.15).expect("valid");
        assert_eq!(loss.profit, 0.0);
        assert_eq!(loss.taxes, 0.0);
        assert_eq!(loss.net_return, 90_000.0);
    }

    #[test]
    fn after_tax_rejects_out_of_range_rate() {
        assert!(after_tax(1.0, 1.0, -0.1).is_err());
        assert!(after_tax(1.0, 1.0, 1.1).is_err());
    }

    #[test]
    fn ties_favour_payoff() {
        assert_eq!(better_strategy(10_000.0, 10_000.0), Strategy::Payoff);
        assert_eq!(better_strategy(10_000.0, 10_000.01), Strategy::Invest);
        assert_eq!(better_strategy(10_000.0, 9_000.0), Strategy::Payoff);
    }

    #[test]
    fn compare_strategies_recommends_investing_when_returns_dominate() {
        let payoff = comparison_with(240, 1_000.0);
        let result = compare_strategies(&payoff, 500.0, 10_000.0, 0.006, 0.15).expect("valid");
        assert!(result.net_benefit > 1_000.0);
        assert_eq!(result.recommendation, Strategy::Invest);
        assert_approx_tol(
            result.net_benefit,
            result.investment.net_return - result.investment.total_invested,
            1e-9,
        );
    }

    #[test]
    fn compare_strategies_recommends_payoff_without_returns() {
        let payoff = comparison_with(240, 30_000.0);
        let result = compare_strategies(&payoff, 500.0, 10_000.0, 0.0, 0.15).expect("valid");
        assert_eq!(result.net_benefit, 0.0);
        assert_eq!(result.recommendation, Strategy::Payoff);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_after_tax_invariants_hold(
            gross in 0u32..2_000_000,
            invested in 0u32..2_000_000,
            tax_pct in 0u32..101
        ) {
            let tax_rate = tax_pct as f64 / 100.0;
            let result = after_tax(gross as f64, invested as f64, tax_rate).expect("valid");
            let expected_profit = (gross as f64 - invested as f64).max(0.0);
            prop_assert!((result.profit - expected_profit).abs() < 1e-9);
            prop_assert!((result.taxes - result.profit * tax_rate).abs() < 1e-9);
            prop_assert!((result.net_return - (result.gross_return - result.taxes)).abs() < 1e-9);
            prop_assert!(result.net_return >= result.total_invested.min(result.gross_return) - 1e-9);
        }
    }
}
