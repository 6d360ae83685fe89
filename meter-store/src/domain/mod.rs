mod consumer;
mod meter_reading;

pub use consumer::Consumer;
pub use meter_reading::MeterReading;
