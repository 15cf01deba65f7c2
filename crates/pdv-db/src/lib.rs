//! # pdv-db: Persistence Layer
//!
//! Everything that touches the SQLite store:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         pdv-db                              │
//! │                                                             │
//! │  pool        DbConfig + Database (WAL, embedded migrations) │
//! │  repository  catalog / stock ledger / sale history          │
//! │  checkout    Checkout service: session + transactional      │
//! │              finalize                                       │
//! │  error       DbError, StoreError                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! pdv-core stays pure; this crate owns every async boundary and every
//! query. The one invariant everything here serves: `products.stock`
//! changes only through the ledger's guarded delta, and a sale's
//! decrements commit together with its history row or not at all.

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use checkout::{Checkout, FinalizeOutcome};
pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use repository::{CatalogRepository, SaleRepository, StockLedger};
