mod meter_reading_queries;

pub use meter_reading_queries::{all_readings, consumer_history, consumers, readings_between};
