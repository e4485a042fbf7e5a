//! Test Data Builders
//!
//! Builder patterns for constructing orders, lines and invoices with
//! sensible defaults, so tests specify only the fields they care about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AccountId, CompanyId, Currency, Money, OrderLineId, PartyId, UomId};
use domain_orders::{
    Invoice, InvoiceKind, InvoiceLine, InvoicingMethod, Order, OrderLine, ProductRef,
    ShipmentMove, ShipmentState,
};

use crate::fixtures::{DateFixtures, UNITS};

/// Builder for test orders
pub struct TestOrderBuilder {
    company: CompanyId,
    customer: PartyId,
    currency: Currency,
    company_currency: Currency,
    invoicing_method: InvoicingMethod,
    shipment_state: ShipmentState,
    lines: Vec<OrderLine>,
    invoices: Vec<Invoice>,
}

impl Default for TestOrderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestOrderBuilder {
    /// Creates a builder with defaults: USD order, USD company, invoiced
    /// on shipment, nothing shipped
    pub fn new() -> Self {
        Self {
            company: CompanyId::new(),
            customer: PartyId::new(),
            currency: Currency::USD,
            company_currency: Currency::USD,
            invoicing_method: InvoicingMethod::OnShipment,
            shipment_state: ShipmentState::Pending,
            lines: Vec::new(),
            invoices: Vec::new(),
        }
    }

    /// Sets the owning company
    pub fn for_company(mut self, company: CompanyId) -> Self {
        self.company = company;
        self
    }

    /// Sets the order currency
    pub fn in_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Sets the company (posting) currency
    pub fn posting_in(mut self, currency: Currency) -> Self {
        self.company_currency = currency;
        self
    }

    /// Sets the invoicing method
    pub fn invoiced(mut self, method: InvoicingMethod) -> Self {
        self.invoicing_method = method;
        self
    }

    /// Marks the order fully shipped
    pub fn sent(mut self) -> Self {
        self.shipment_state = ShipmentState::Sent;
        self
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

    /// Builds the order
    pub fn build(self) -> Order {
        let mut order = Order::new(
            self.company,
            self.customer,
            self.currency,
            self.company_currency,
            self.invoicing_method,
        )
        .with_shipment_state(self.shipment_state);
        for line in self.lines {
            order = order.with_line(line);
        }
        for invoice in self.invoices {
            order = order.with_invoice(invoice);
        }
        order
    }
}

/// Builder for test order lines
pub struct TestLineBuilder {
    product: ProductRef,
    quantity: Decimal,
    unit_price: Money,
    uom: UomId,
    moves: Vec<ShipmentMove>,
}

impl Default for TestLineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLineBuilder {
    /// Creates a builder with defaults: 10 pieces of a goods product at
    /// 5.00 USD, not yet shipped
    pub fn new() -> Self {
        Self {
            product: ProductRef::goods("Widget", AccountId::new()),
            quantity: dec!(10),
            unit_price: Money::new(dec!(5.00), Currency::USD),
            uom: UNITS.piece.id,
            moves: Vec::new(),
        }
    }

    /// Replaces the product
    pub fn of_product(mut self, product: ProductRef) -> Self {
        self.product = product;
        self
    }

    /// Sets the ordered quantity
    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the unit price
    pub fn priced(mut self, unit_price: Money) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// Sets the line unit
    pub fn in_uom(mut self, uom: UomId) -> Self {
        self.uom = uom;
        self
    }

    /// Adds an executed shipment move in the line's unit
    pub fn shipped(mut self, quantity: Decimal) -> Self {
        self.moves
            .push(ShipmentMove::new(self.product.clone(), quantity, self.uom).done());
        self
    }

    /// Adds an executed shipment move in a different unit
    pub fn shipped_in(mut self, quantity: Decimal, uom: UomId) -> Self {
        self.moves
            .push(ShipmentMove::new(self.product.clone(), quantity, uom).done());
        self
    }

    /// Adds a not-yet-executed move
    pub fn pending(mut self, quantity: Decimal) -> Self {
        self.moves
            .push(ShipmentMove::new(self.product.clone(), quantity, self.uom));
        self
    }

    /// Adds a prepared move
    pub fn with_move(mut self, shipment_move: ShipmentMove) -> Self {
        self.moves.push(shipment_move);
        self
    }

    /// Builds the order line
    pub fn build(self) -> OrderLine {
        let mut line = OrderLine::new(self.product, self.quantity, self.unit_price, self.uom);
        line.moves = self.moves;
        line
    }
}

/// Builder for test invoices
pub struct TestInvoiceBuilder {
    kind: InvoiceKind,
    currency: Currency,
    date: NaiveDate,
    lines: Vec<InvoiceLine>,
    posted: bool,
}

impl Default for TestInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestInvoiceBuilder {
    /// Creates a builder for a posted USD invoice
    pub fn new() -> Self {
        Self {
            kind: InvoiceKind::Invoice,
            currency: Currency::USD,
            date: DateFixtures::invoice_date(),
            lines: Vec::new(),
            posted: true,
        }
    }

    /// Makes it a credit note
    pub fn credit_note(mut self) -> Self {
        self.kind = InvoiceKind::CreditNote;
        self
    }

    /// Sets the invoice currency
    pub fn in_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Leaves the invoice in draft
    pub fn draft(mut self) -> Self {
        self.posted = false;
        self
    }

    /// Adds a line billing an order line
    pub fn billing(
        mut self,
        order_line: OrderLineId,
        quantity: Decimal,
        uom: UomId,
        amount: Money,
    ) -> Self {
        self.lines
            .push(InvoiceLine::new(quantity, uom, amount).for_order_line(order_line));
        self
    }

    /// Builds the invoice
    pub fn build(self) -> Invoice {
        let mut invoice = Invoice::new(self.kind, self.currency, self.date);
        for line in self.lines {
            invoice = invoice.with_line(line);
        }
        if self.posted {
            invoice = invoice.post();
        }
        invoice
    }
}
