mod mapping;
mod price;
mod server_config;
mod window;

pub use mapping::{MappingEntry, MappingSnapshot};
pub use price::{MergedPriceRecord, MergedSnapshot, PricesResponse};
pub use server_config::ServerConfig;
pub use window::{Window, WindowRecord, WindowResponse, WindowSnapshot};
