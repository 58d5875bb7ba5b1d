use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The payment never exceeds the interest accruing on the balance.
    #[error(
        "payment of {payment:.2} does not cover interest of {interest:.2} in month {month}; the loan never pays off"
    )]
    NeverPaysOff {
        month: u32,
        interest: f64,
        payment: f64,
    },

    #[error(
        "loan is not paid off within {limit} months ({remaining_balance:.2} still outstanding)"
    )]
    IterationLimitExceeded { limit: u32, remaining_balance: f64 },

    #[error(
        "age at readiness is undefined for current savings of {current_savings:.2}; savings must be > 0"
    )]
    UndefinedCoastAge { current_savings: f64 },
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "invalid-input",
            EngineError::NeverPaysOff { .. } => "never-pays-off",
            EngineError::IterationLimitExceeded { .. } => "iteration-limit-exceeded",
            EngineError::UndefinedCoastAge { .. } => "undefined-coast-age",
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub(crate) fn require_finite(field: &'static str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::invalid(field, format!("must be finite, got {value}")))
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> EngineResult<f64> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(EngineError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(value)
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> EngineResult<f64> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(EngineError::invalid(field, format!("must be > 0, got {value}")));
    }
    Ok(value)
}

/// A growth or discount rate cannot lose more than 100%.
pub(crate) fn require_rate(field: &'static str, value: f64) -> EngineResult<f64> {
    require_finite(field, value)?;
    if value < -1.0 {
        return Err(EngineError::invalid(field, format!("must be >= -1, got {value}")));
    }
    Ok(value)
}

pub(crate) fn require_fraction(field: &'static str, value: f64) -> EngineResult<f64> {
    require_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(EngineError::invalid(
            field,
            format!("must be between 0 and 1, got {value}"),
        ));
    }
    Ok(value)
}
