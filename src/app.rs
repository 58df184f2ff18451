use chrono::{NaiveDate, Utc};

use crate::calc::{OrderFormState, OrderTotals, QuoteFormState, QuoteTotals};
use crate::db::{Database, KeyValueStore};
use crate::error::{RecordKind, Result};
use crate::history::{Direction, HistoryStore};
use crate::model::{Order, OrderPatch, Quote, QuotePatch};
use crate::stats::{sales_report, SalesFilter, SalesReport};

pub const SAVE_ORDER_FAILED: &str =
    "Ocurrió un error al guardar el pedido. Por favor, inténtelo de nuevo.";
pub const SAVE_QUOTE_FAILED: &str =
    "Ocurrió un error al guardar la cotización. Por favor, inténtelo de nuevo.";
pub const UPDATE_FAILED: &str =
    "Ocurrió un error al actualizar el pedido. El cambio no fue guardado.";
pub const REORDER_FAILED: &str =
    "Ocurrió un error al reordenar el pedido. El cambio no fue guardado.";
pub const DELETE_FAILED: &str =
    "Ocurrió un error al eliminar el elemento. La acción no se completó.";

/// A record awaiting the user's delete confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionTarget {
    pub kind: RecordKind,
    pub id: i64,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Application state behind the forms: both histories, both forms, what is
/// being edited, and the last message to show the user.
pub struct Workshop<S: KeyValueStore + Clone = Database> {
    pub orders: HistoryStore<Order, S>,
    pub quotes: HistoryStore<Quote, S>,
    pub order_form: OrderFormState,
    pub quote_form: QuoteFormState,
    editing_order_id: Option<i64>,
    editing_quote_id: Option<i64>,
    pending_deletion: Option<DeletionTarget>,
    last_error: Option<String>,
    today: fn() -> NaiveDate,
}

impl<S: KeyValueStore + Clone> Workshop<S> {
    /// Loads both histories from `backend`.
    pub fn open(backend: S) -> Result<Self> {
        let orders = HistoryStore::load(backend.clone())?;
        let quotes = HistoryStore::load(backend)?;
        let today = utc_today;
        Ok(Workshop {
            orders,
            quotes,
            order_form: OrderFormState::new(today()),
            quote_form: QuoteFormState::new(),
            editing_order_id: None,
            editing_quote_id: None,
            pending_deletion: None,
            last_error: None,
            today,
        })
    }

    /// Replaces the calendar used for new dates.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self.order_form.order_date = crate::parse::date_text(today());
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn editing_order_id(&self) -> Option<i64> {
        self.editing_order_id
    }

    pub fn editing_quote_id(&self) -> Option<i64> {
        self.editing_quote_id
    }

    pub fn pending_deletion(&self) -> Option<DeletionTarget> {
        self.pending_deletion
    }

    fn record<T>(&mut self, result: Result<T>, message: &str) -> Result<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(_) => self.last_error = Some(message.to_string()),
        }
        result
    }

    // --- Orders ---

    pub fn order_totals(&self) -> OrderTotals {
        self.order_form.totals()
    }

    pub fn reset_order_form(&mut self) {
        self.order_form = OrderFormState::new(self.today());
        self.editing_order_id = None;
        self.last_error = None;
    }

    /// Saves the order form as a new order, or over the order being edited.
    /// The form is only cleared when the write succeeded.
    pub fn save_order(&mut self) -> Result<i64> {
        let draft = self.order_form.to_order();
        let result = self.orders.save(draft, self.editing_order_id);
        let id = self.record(result, SAVE_ORDER_FAILED)?;
        self.reset_order_form();
        Ok(id)
    }

    pub fn edit_order(&mut self, id: i64) -> Result<()> {
        let order = self.find_order(id)?;
        self.order_form = OrderFormState::from_order(order);
        self.editing_order_id = Some(id);
        Ok(())
    }

    /// Fills the form from an existing order; saving it creates a new one dated today.
    pub fn copy_order(&mut self, id: i64) -> Result<()> {
        let today = self.today();
        let order = self.find_order(id)?;
        self.order_form = OrderFormState::copy_of(order, today);
        self.editing_order_id = None;
        Ok(())
    }

    pub fn update_order(&mut self, id: i64, patch: OrderPatch) -> Result<()> {
        let result = self.orders.update(id, patch).map(|_| ());
        self.record(result, UPDATE_FAILED)
    }

    pub fn reorder_order(&mut self, id: i64, direction: Direction) -> Result<bool> {
        let result = self.orders.reorder(id, direction);
        self.record(result, REORDER_FAILED)
    }

    fn find_order(&self, id: i64) -> Result<&Order> {
        self.orders
            .get(id)
            .ok_or(crate::error::LedgerError::NotFound { kind: RecordKind::Order, id })
    }

    // --- Quotes ---

    pub fn quote_totals(&self) -> QuoteTotals {
        self.quote_form.totals()
    }

    pub fn reset_quote_form(&mut self) {
        self.quote_form = QuoteFormState::new();
        self.editing_quote_id = None;
        self.last_error = None;
    }

    /// Saves the quote form, stamped with today's date.
    pub fn save_quote(&mut self) -> Result<i64> {
        let draft = self.quote_form.to_quote(self.today());
        let result = self.quotes.save(draft, self.editing_quote_id);
        let id = self.record(result, SAVE_QUOTE_FAILED)?;
        self.reset_quote_form();
        Ok(id)
    }

    pub fn edit_quote(&mut self, id: i64) -> Result<()> {
        let quote = self.find_quote(id)?;
        self.quote_form = QuoteFormState::from_quote(quote);
        self.editing_quote_id = Some(id);
        Ok(())
    }

    pub fn copy_quote(&mut self, id: i64) -> Result<()> {
        let quote = self.find_quote(id)?;
        self.quote_form = QuoteFormState::from_quote(quote);
        self.editing_quote_id = None;
        Ok(())
    }

    pub fn update_quote(&mut self, id: i64, patch: QuotePatch) -> Result<()> {
        let result = self.quotes.update(id, patch).map(|_| ());
        self.record(result, UPDATE_FAILED)
    }

    fn find_quote(&self, id: i64) -> Result<&Quote> {
        self.quotes
            .get(id)
            .ok_or(crate::error::LedgerError::NotFound { kind: RecordKind::Quote, id })
    }

    // --- Deletion ---

    pub fn request_deletion(&mut self, kind: RecordKind, id: i64) {
        self.pending_deletion = Some(DeletionTarget { kind, id });
    }

    pub fn cancel_deletion(&mut self) {
        self.pending_deletion = None;
    }

    /// Deletes the pending target. The target is cleared whether or not the
    /// delete succeeded; returns `None` when nothing was pending.
    pub fn confirm_deletion(&mut self) -> Result<Option<DeletionTarget>> {
        let Some(target) = self.pending_deletion.take() else {
            return Ok(None);
        };
        let result = match target.kind {
            RecordKind::Order => self.orders.delete(target.id).map(|_| ()),
            RecordKind::Quote => self.quotes.delete(target.id).map(|_| ()),
        };
        self.record(result, DELETE_FAILED)?;

        match target.kind {
            RecordKind::Order if self.editing_order_id == Some(target.id) => {
                self.editing_order_id = None
            }
            RecordKind::Quote if self.editing_quote_id == Some(target.id) => {
                self.editing_quote_id = None
            }
            _ => {}
        }
        Ok(Some(target))
    }

    // --- Sales ---

    pub fn sales_report(&self, filter: &SalesFilter) -> SalesReport {
        sales_report(self.orders.list(), filter)
    }
}
