//! Sales Order Domain
//!
//! The order-to-cash object graph consumed by the recognition engine:
//! orders and their lines, the shipment moves fulfilling them, and the
//! customer invoices billing them. Documents that were ignored or replaced
//! by a newer version carry a [`Standing`] marker and are excluded from
//! every aggregation by construction.

pub mod standing;
pub mod product;
pub mod order;
pub mod shipment;
pub mod invoice;

pub use standing::Standing;
pub use product::{ProductKind, ProductRef};
pub use order::{InvoicingMethod, Order, OrderLine, ShipmentState};
pub use shipment::{MoveState, ShipmentMove};
pub use invoice::{Invoice, InvoiceKind, InvoiceLine, InvoiceState};
