//! Shipment moves
//!
//! A shipment move is one product movement fulfilling a sale line. Only
//! `Done` moves count as fulfilled; exception-flagged moves are still
//! included in quantity aggregation so the totals stay continuous with the
//! replacement document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceLineId, ShipmentMoveId, UomId};

use crate::product::ProductRef;
use crate::standing::Standing;

/// Lifecycle state of a shipment move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    /// Not yet executed
    Pending,
    /// Goods left the warehouse
    Done,
    /// Terminated without execution
    Cancelled,
}

/// One product movement fulfilling a sale line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentMove {
    /// Unique identifier
    pub id: ShipmentMoveId,
    /// Product being moved (carries the revenue account)
    pub product: ProductRef,
    /// Moved quantity, always positive, in `uom`
    pub quantity: Decimal,
    /// Unit the quantity is expressed in
    pub uom: UomId,
    /// Lifecycle state
    pub state: MoveState,
    /// Supersession standing
    pub standing: Standing<ShipmentMoveId>,
    /// Invoice lines that already bill this move
    pub invoice_lines: Vec<InvoiceLineId>,
}

impl ShipmentMove {
    /// Creates a pending move
    pub fn new(product: ProductRef, quantity: Decimal, uom: UomId) -> Self {
        Self {
            id: ShipmentMoveId::new_v7(),
            product,
            quantity,
            uom,
            state: MoveState::Pending,
            standing: Standing::Active,
            invoice_lines: Vec::new(),
        }
    }

    /// Marks the move as executed
    pub fn done(mut self) -> Self {
        self.state = MoveState::Done;
        self
    }

    /// Sets the supersession standing
    pub fn with_standing(mut self, standing: Standing<ShipmentMoveId>) -> Self {
        self.standing = standing;
        self
    }

    /// Links an invoice line billing this move
    pub fn link_invoice_line(&mut self, line: InvoiceLineId) {
        self.invoice_lines.push(line);
    }

    /// Returns true when this move contributes to fulfilled quantity
    ///
    /// `Done` moves count. Exception-flagged moves count regardless of
    /// state so the aggregate stays continuous with their replacement.
    pub fn counts_as_fulfilled(&self) -> bool {
        matches!(self.state, MoveState::Done) || self.standing.is_exception()
    }
}
