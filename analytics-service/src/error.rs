/// Configuration errors raised by the analytics engine.
///
/// Every variant is a caller or deployment mistake detected before any
/// computation starts; no partial result is ever produced alongside one.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("tariff windows leave hour {0} uncovered")]
    TariffGap(u8),
    #[error("tariff windows cover hour {0} more than once")]
    TariffOverlap(u8),
    #[error("tariff window '{bucket}' {start}..{end} is not a valid hour range")]
    TariffWindowRange { bucket: String, start: u8, end: u8 },
    #[error("unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
