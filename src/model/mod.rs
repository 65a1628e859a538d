//! Data model shared by the backend client, the store client and the
//! reconciliation engine.
//!
//! Everything here is a plain value type: a fresh fetch produces a new
//! value, nothing is mutated in place. Serde field names follow the
//! backend wire contract exactly.

pub mod entitlement;
pub mod envelope;
pub mod offering;
pub mod period;
pub mod product;
pub mod theme;

pub use entitlement::{Entitlement, EntitlementSnapshot, PurchaseProof};
pub use envelope::{ApiEnvelope, ErrorInfo};
pub use offering::{DiscountMode, OfferDiscount, StoreOffering};
pub use period::{PeriodParseError, PeriodUnit, RecurringPeriod};
pub use product::CatalogProduct;
pub use theme::ThemeEntry;
