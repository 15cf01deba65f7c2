//! # Repository Layer
//!
//! Data access, split by concern:
//! - `catalog`: products and groups (read-through + maintenance)
//! - `stock`: the atomic stock ledger
//! - `sale`: the append-only sale history

pub mod catalog;
pub mod sale;
pub mod stock;

pub use catalog::CatalogRepository;
pub use sale::SaleRepository;
pub use stock::StockLedger;
