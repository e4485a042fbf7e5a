//! Customer invoices
//!
//! Invoices are created and posted by the host billing system; the
//! recognition engine only reads them. Credit notes negate their line
//! amounts in every aggregation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, InvoiceId, InvoiceLineId, Money, OrderLineId, UomId};

use crate::standing::Standing;

/// Invoice kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    /// Regular customer invoice
    Invoice,
    /// Credit note; line amounts count negatively
    CreditNote,
}

/// Invoice lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceState {
    Draft,
    Posted,
    Paid,
    Cancelled,
}

/// A customer invoice attached to an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Invoice or credit note
    pub kind: InvoiceKind,
    /// Lifecycle state
    pub state: InvoiceState,
    /// Supersession standing
    pub standing: Standing<InvoiceId>,
    /// Invoice currency (the order currency)
    pub currency: Currency,
    /// Invoice date
    pub date: NaiveDate,
    /// Line items
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    /// Creates a draft invoice
    pub fn new(kind: InvoiceKind, currency: Currency, date: NaiveDate) -> Self {
        Self {
            id: InvoiceId::new_v7(),
            kind,
            state: InvoiceState::Draft,
            standing: Standing::Active,
            currency,
            date,
            lines: Vec::new(),
        }
    }

    /// Adds a line item
    pub fn with_line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Sets the supersession standing
    pub fn with_standing(mut self, standing: Standing<InvoiceId>) -> Self {
        self.standing = standing;
        self
    }

    /// Marks the invoice as posted
    pub fn post(mut self) -> Self {
        self.state = InvoiceState::Posted;
        self
    }

    /// Marks the invoice as paid
    pub fn pay(mut self) -> Self {
        self.state = InvoiceState::Paid;
        self
    }

    /// Returns true once the host ledger carries this invoice
    pub fn is_settled(&self) -> bool {
        matches!(self.state, InvoiceState::Posted | InvoiceState::Paid)
    }

    /// Sign applied to this invoice's amounts in aggregations
    pub fn sign(&self) -> Decimal {
        match self.kind {
            InvoiceKind::Invoice => Decimal::ONE,
            InvoiceKind::CreditNote => Decimal::NEGATIVE_ONE,
        }
    }

    /// Amount of `line` with the credit-note sign applied
    pub fn signed_line_amount(&self, line: &InvoiceLine) -> Money {
        line.amount.multiply(self.sign())
    }

    /// Quantity of `line` with the credit-note sign applied
    pub fn signed_line_quantity(&self, line: &InvoiceLine) -> Decimal {
        line.quantity * self.sign()
    }
}

/// A line item on a customer invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Unique identifier
    pub id: InvoiceLineId,
    /// Back-reference to the originating order line
    pub order_line: Option<OrderLineId>,
    /// Billed quantity in `uom`
    pub quantity: Decimal,
    /// Unit the quantity is expressed in
    pub uom: UomId,
    /// Line amount in the invoice currency
    pub amount: Money,
}

impl InvoiceLine {
    /// Creates an invoice line
    pub fn new(quantity: Decimal, uom: UomId, amount: Money) -> Self {
        Self {
            id: InvoiceLineId::new_v7(),
            order_line: None,
            quantity,
            uom,
            amount,
        }
    }

    /// Tags the line with its originating order line
    pub fn for_order_line(mut self, line: OrderLineId) -> Self {
        self.order_line = Some(line);
        self
    }
}
