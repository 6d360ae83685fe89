use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// One half-hourly import sample as recorded by the meter.
///
/// `ts` is local wall-clock time on a `:00` or `:30` boundary and `wh_imp` is
/// the imported energy for the preceding half hour in watt-hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MeterReading {
    pub consumer_id: String,
    pub ts: PrimitiveDateTime,
    pub wh_imp: f64,
}
