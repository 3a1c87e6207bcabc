// Car Catalog - Core Library
// In-memory vehicle catalog: category-ordered list + price-ordered index.
// Used by the command shell, the terminal browser and the tests.

pub mod arena;
pub mod catalog;
pub mod config;
pub mod error;
pub mod list;
pub mod price_index;
pub mod vehicle;

// Re-export commonly used types
pub use arena::{Arena, Handle};
pub use catalog::{Catalog, CatalogStats, VehicleId};
pub use config::CatalogConfig;
pub use error::{CatalogError, Result, ValidationError};
pub use list::CategoryList;
pub use price_index::{PriceEntry, PriceIndex};
pub use vehicle::{
    Category, SedanSpec, SuvSpec, TruckSpec, TrunkSize, Vehicle, VehicleSpec, MAX_YEAR, MIN_YEAR,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
