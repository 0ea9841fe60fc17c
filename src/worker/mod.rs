pub mod price_worker;
pub mod startup;

pub use price_worker::run as run_price_worker;
pub use startup::spawn_warmup;
