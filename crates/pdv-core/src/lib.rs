//! # pdv-core: Pure Business Logic for the PDV Terminal
//!
//! The heart of the point-of-sale system: every business rule lives
//! here as deterministic functions over values, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! UI / controller collaborator (out of scope)
//!        │ dispatches intents
//!        ▼
//! ★ pdv-core (THIS CRATE) ★
//!   money · cart · payment · checkout session · reports · stock views
//!   NO I/O · NO DATABASE · PURE FUNCTIONS
//!        │
//!        ▼
//! pdv-db  -- SQLite catalog, stock ledger, sale history, and the
//!           transactional finalize that drives the session's
//!           Finalizing handshake
//! ```
//!
//! ## Design Principles
//!
//! 1. **Integer money**: all amounts are centavos (`i64`); the
//!    comparison gating finalize is never floating point.
//! 2. **Snapshots over references**: cart lines and sale items freeze
//!    product name and price at capture time.
//! 3. **Explicit errors**: every failure is a [`CoreError`] variant and
//!    leaves state untouched.
//! 4. **Two stock checks, on purpose**: the cart's advisory bound is a
//!    UX guard; the authoritative gate is the ledger re-check inside
//!    the finalize transaction.

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod payment;
pub mod report;
pub mod stock;
pub mod types;

pub use cart::{Cart, CartLine};
pub use checkout::{CheckoutSession, CheckoutState, SaleDraft};
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use payment::{PaymentAssessment, TenderSet};
pub use types::{Group, PaymentMethod, PaymentSplit, Product, Sale, SaleLine};
