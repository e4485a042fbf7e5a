//! Sale orders and their lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, AnalyticAccountId, CompanyId, Currency, InvoiceLineId, Money, OrderId, OrderLineId, PartyId, UomId};

use crate::invoice::{Invoice, InvoiceLine};
use crate::product::ProductRef;
use crate::shipment::ShipmentMove;

/// How an order gets invoiced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoicingMethod {
    /// Invoices raised by hand
    Manual,
    /// Invoiced in full when the order is confirmed
    OnOrder,
    /// Invoiced as goods ship
    OnShipment,
}

impl InvoicingMethod {
    /// Returns true when goods can ship before they are billed, so
    /// shipped-not-invoiced revenue must be recognized provisionally
    pub fn requires_provisional_recognition(&self) -> bool {
        !matches!(self, InvoicingMethod::Manual | InvoicingMethod::OnOrder)
    }
}

/// Aggregate shipment progress of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentState {
    /// Nothing shipped yet
    Pending,
    /// Some, but not all, goods shipped
    Partial,
    /// Everything shipped
    Sent,
}

/// A sale order
///
/// Orders and their lines are created upstream; the recognition engine
/// only reads them and posts ledger moves referencing them as origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: OrderId,
    /// Owning company
    pub company: CompanyId,
    /// Customer being billed
    pub customer: PartyId,
    /// Currency prices are expressed in
    pub currency: Currency,
    /// Currency the company posts its ledger in
    pub company_currency: Currency,
    /// Invoicing method
    pub invoicing_method: InvoicingMethod,
    /// Aggregate shipment progress
    pub shipment_state: ShipmentState,
    /// Order lines, in entry order
    pub lines: Vec<OrderLine>,
    /// Invoices raised against this order
    pub invoices: Vec<Invoice>,
}

impl Order {
    /// Creates an empty order
    pub fn new(
        company: CompanyId,
        customer: PartyId,
        currency: Currency,
        company_currency: Currency,
        invoicing_method: InvoicingMethod,
    ) -> Self {
        Self {
            id: OrderId::new_v7(),
            company,
            customer,
            currency,
            company_currency,
            invoicing_method,
            shipment_state: ShipmentState::Pending,
            lines: Vec::new(),
            invoices: Vec::new(),
        }
    }

    /// Adds an order line
    pub fn with_line(mut self, line: OrderLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Attaches an invoice
    pub fn with_invoice(mut self, invoice: Invoice) -> Self {
        self.invoices.push(invoice);
        self
    }

    /// Sets the aggregate shipment state
    pub fn with_shipment_state(mut self, state: ShipmentState) -> Self {
        self.shipment_state = state;
        self
    }

    /// Invoices that are the active version of their document
    pub fn active_invoices(&self) -> impl Iterator<Item = &Invoice> {
        self.invoices.iter().filter(|i| i.standing.is_active())
    }

    /// Active invoices the host ledger already carries (posted or paid)
    pub fn settled_invoices(&self) -> impl Iterator<Item = &Invoice> {
        self.active_invoices().filter(|i| i.is_settled())
    }

    /// Returns true when every active invoice is posted or paid
    pub fn all_invoices_settled(&self) -> bool {
        self.active_invoices().all(|i| i.is_settled())
    }

    /// Returns true when the order is fully shipped
    pub fn is_fully_shipped(&self) -> bool {
        matches!(self.shipment_state, ShipmentState::Sent)
    }

    /// Looks up an invoice line by id, together with its owning invoice
    pub fn find_invoice_line(&self, id: InvoiceLineId) -> Option<(&Invoice, &InvoiceLine)> {
        self.invoices.iter().find_map(|invoice| {
            invoice
                .lines
                .iter()
                .find(|line| line.id == id)
                .map(|line| (invoice, line))
        })
    }
}

/// One line of a sale order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Unique identifier
    pub id: OrderLineId,
    /// Product sold; None for free-text lines
    pub product: Option<ProductRef>,
    /// Ordered quantity in `uom`; negative quantities are returns
    pub quantity: Decimal,
    /// Price per unit, in the order currency
    pub unit_price: Money,
    /// Unit the quantity and price refer to
    pub uom: UomId,
    /// Shipment moves fulfilling this line
    pub moves: Vec<ShipmentMove>,
}

impl OrderLine {
    /// Creates an order line for a product
    pub fn new(product: ProductRef, quantity: Decimal, unit_price: Money, uom: UomId) -> Self {
        Self {
            id: OrderLineId::new_v7(),
            product: Some(product),
            quantity,
            unit_price,
            uom,
            moves: Vec::new(),
        }
    }

    /// Creates a free-text line without a product
    pub fn free_text(quantity: Decimal, unit_price: Money, uom: UomId) -> Self {
        Self {
            id: OrderLineId::new_v7(),
            product: None,
            quantity,
            unit_price,
            uom,
            moves: Vec::new(),
        }
    }

    /// Adds a shipment move
    pub fn with_move(mut self, shipment_move: ShipmentMove) -> Self {
        self.moves.push(shipment_move);
        self
    }

    /// Sign of the line: -1 for returns, +1 otherwise
    pub fn sign(&self) -> Decimal {
        if self.quantity < Decimal::ZERO {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ONE
        }
    }

    /// Returns true when this line participates in shipment-based
    /// recognition: it sells goods and at least one move exists for it
    pub fn is_recognizable(&self) -> bool {
        self.product.as_ref().is_some_and(|p| p.is_goods()) && !self.moves.is_empty()
    }

    /// Revenue account of the line's product
    pub fn revenue_account(&self) -> Option<AccountId> {
        self.product.as_ref().map(|p| p.revenue_account)
    }

    /// Analytic accounts configured on the line's product
    pub fn analytic_accounts(&self) -> &[AnalyticAccountId] {
        self.product
            .as_ref()
            .map(|p| p.analytic_accounts.as_slice())
            .unwrap_or(&[])
    }
}
