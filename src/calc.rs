//! Order and quote calculators.
//!
//! Form state is owned by the caller; everything here is a pure function of it.

use chrono::{NaiveDate, TimeDelta};

use crate::config::{DEPOSIT_RATE, IVA_RATE, PAIRS_PER_BOX};
use crate::format::production_time_label;
use crate::model::{
    InvoiceStatus, Order, OrderStatus, OrderType, PaymentStatus, Profile, Quote, ShoeModel,
};
use crate::parse::{date_text, lenient_count, lenient_currency, production_days, stored_date};
use crate::sizes::SizeQuantities;

/// Boxes needed to ship `pairs`; zero pairs need no box.
pub fn boxes_for(pairs: u64) -> u64 {
    if pairs == 0 {
        0
    } else {
        pairs.div_ceil(PAIRS_PER_BOX)
    }
}

/// Delivery date: `start + N` calendar days, where N leads `production_time`.
///
/// Returns `start` unchanged when it is empty, either input cannot be read,
/// or the day count falls outside the calendar.
pub fn end_date(start: &str, production_time: &str) -> String {
    let Some(span) = production_days(production_time).and_then(TimeDelta::try_days) else {
        return start.to_string();
    };
    stored_date(start)
        .and_then(|d| d.checked_add_signed(span))
        .map(date_text)
        .unwrap_or_else(|| start.to_string())
}

/// Moves an end date along with a new start date, keeping the stored span.
pub fn shift_end_date(old_start: &str, old_end: &str, new_start: &str) -> Option<String> {
    let span = stored_date(old_end)?.signed_duration_since(stored_date(old_start)?);
    stored_date(new_start)?
        .checked_add_signed(span)
        .map(date_text)
}

/// Whole days between two stored dates, if both are readable.
pub fn span_days(start: &str, end: &str) -> Option<i64> {
    Some(stored_date(end)?.signed_duration_since(stored_date(start)?).num_days())
}

/// Everything the order form holds, as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFormState {
    pub client_name: String,
    pub order_type: Option<OrderType>,
    pub model: Option<ShoeModel>,
    pub profile: Option<Profile>,
    pub order_date: String,
    pub production_time: String,
    pub price_per_pair: String,
    pub shipping_per_box: String,
    pub sizes: SizeQuantities,
    pub attached_image_url: Option<String>,
}

/// Figures derived from an order form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderTotals {
    pub total_pairs: u64,
    pub total_boxes: u64,
    pub price_per_pair: f64,
    pub shipping_per_box: f64,
    pub total_shipping_cost: f64,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
    pub deposit: f64,
}

impl OrderFormState {
    /// A blank form dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        OrderFormState {
            client_name: String::new(),
            order_type: None,
            model: None,
            profile: None,
            order_date: date_text(today),
            production_time: String::new(),
            price_per_pair: String::new(),
            shipping_per_box: String::new(),
            sizes: SizeQuantities::new(),
            attached_image_url: None,
        }
    }

    /// Seeds the form for re-editing a stored order.
    pub fn from_order(order: &Order) -> Self {
        let production_time = span_days(&order.start_date, &order.end_date)
            .map(production_time_label)
            .unwrap_or_default();
        OrderFormState {
            client_name: order.client_name.clone(),
            order_type: order.order_type,
            model: order.model,
            profile: order.profile,
            order_date: order.start_date.clone(),
            production_time,
            price_per_pair: format!("${}", order.price_per_pair),
            shipping_per_box: format!("${}", order.shipping_per_box),
            sizes: order.sizes,
            attached_image_url: order.attached_image_url.clone(),
        }
    }

    /// Seeds the form for a new order copied from `order`, dated `today`.
    pub fn copy_of(order: &Order, today: NaiveDate) -> Self {
        OrderFormState {
            order_date: date_text(today),
            ..Self::from_order(order)
        }
    }

    pub fn totals(&self) -> OrderTotals {
        order_totals(self)
    }

    /// The record this form would save. Workflow fields start at their defaults.
    pub fn to_order(&self) -> Order {
        let t = self.totals();
        Order {
            id: 0,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::ChooseOption,
            invoice_status: InvoiceStatus::ChooseOption,
            start_date: self.order_date.clone(),
            end_date: end_date(&self.order_date, &self.production_time),
            order_type: self.order_type,
            model: self.model,
            profile: self.profile,
            client_name: self.client_name.clone(),
            sizes: self.sizes,
            total_pairs: t.total_pairs,
            price_per_pair: t.price_per_pair,
            total_boxes: t.total_boxes,
            shipping_per_box: t.shipping_per_box,
            total_shipping_cost: t.total_shipping_cost,
            subtotal: t.subtotal,
            iva: t.iva,
            total: t.total,
            deposit: t.deposit,
            comments: String::new(),
            attached_image_url: self.attached_image_url.clone(),
        }
    }
}

pub fn order_totals(form: &OrderFormState) -> OrderTotals {
    let price_per_pair = lenient_currency(&form.price_per_pair);
    let shipping_per_box = lenient_currency(&form.shipping_per_box);

    let total_pairs = form.sizes.total();
    let total_boxes = boxes_for(total_pairs);
    let total_shipping_cost = total_boxes as f64 * shipping_per_box;
    let subtotal = total_pairs as f64 * price_per_pair + total_shipping_cost;
    let iva = subtotal * IVA_RATE;
    let total = subtotal + iva;
    let deposit = total * DEPOSIT_RATE;

    OrderTotals {
        total_pairs,
        total_boxes,
        price_per_pair,
        shipping_per_box,
        total_shipping_cost,
        subtotal,
        iva,
        total,
        deposit,
    }
}

/// Everything the quote form holds, as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteFormState {
    pub client_name: String,
    pub profile: Option<Profile>,
    pub pairs: String,
    pub price_per_pair: String,
    pub production_time: String,
    pub shipping_cost_per_box: String,
    pub boxes: String,
    pub attached_image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuoteTotals {
    pub pairs: u64,
    pub boxes: u64,
    pub price_per_pair: f64,
    pub shipping_cost_per_box: f64,
    pub total_shipping: f64,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
}

impl QuoteFormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the pairs field and re-derives the box count from it.
    ///
    /// The boxes field stays editable; a later `set_boxes` wins until pairs change again.
    pub fn set_pairs(&mut self, input: &str) {
        let before = lenient_count(&self.pairs);
        self.pairs = input.chars().filter(|c| c.is_ascii_digit()).collect();
        let after = lenient_count(&self.pairs);
        if before != after || self.boxes.is_empty() {
            self.boxes = boxes_for(after).to_string();
        }
    }

    pub fn set_boxes(&mut self, input: &str) {
        self.boxes = input.chars().filter(|c| c.is_ascii_digit()).collect();
    }

    /// Seeds the form from a stored quote.
    pub fn from_quote(quote: &Quote) -> Self {
        QuoteFormState {
            client_name: quote.client_name.clone(),
            profile: quote.profile,
            pairs: quote.pairs.to_string(),
            price_per_pair: format!("${}", quote.price_per_pair),
            production_time: quote.production_time.clone(),
            shipping_cost_per_box: format!("${}", quote.shipping_cost_per_box),
            boxes: quote.boxes.to_string(),
            attached_image_url: quote.attached_image_url.clone(),
        }
    }

    pub fn totals(&self) -> QuoteTotals {
        quote_totals(self)
    }

    /// The record this form would save on `today`.
    pub fn to_quote(&self, today: NaiveDate) -> Quote {
        let t = self.totals();
        Quote {
            id: 0,
            date: date_text(today),
            client_name: self.client_name.clone(),
            profile: self.profile,
            pairs: t.pairs,
            price_per_pair: t.price_per_pair,
            shipping_cost_per_box: t.shipping_cost_per_box,
            production_time: self.production_time.clone(),
            attached_image_url: self.attached_image_url.clone(),
            boxes: t.boxes,
            total_shipping: t.total_shipping,
            subtotal: t.subtotal,
            iva: t.iva,
            total: t.total,
        }
    }
}

/// Quote figures. Unlike orders, the subtotal leaves shipping out; tax
/// is charged on subtotal plus shipping.
pub fn quote_totals(form: &QuoteFormState) -> QuoteTotals {
    let pairs = lenient_count(&form.pairs);
    let boxes = lenient_count(&form.boxes);
    let price_per_pair = lenient_currency(&form.price_per_pair);
    let shipping_cost_per_box = lenient_currency(&form.shipping_cost_per_box);

    let total_shipping = boxes as f64 * shipping_cost_per_box;
    let subtotal = pairs as f64 * price_per_pair;
    let iva = (subtotal + total_shipping) * IVA_RATE;
    let total = subtotal + total_shipping + iva;

    QuoteTotals {
        pairs,
        boxes,
        price_per_pair,
        shipping_cost_per_box,
        total_shipping,
        subtotal,
        iva,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizes::SizeLabel;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn twenty_pair_form() -> OrderFormState {
        let mut form = OrderFormState::new(day(2024, 1, 1));
        form.sizes.set(SizeLabel::S7, 5);
        form.sizes.set(SizeLabel::S8, 15);
        form.price_per_pair = "$10".into();
        form.shipping_per_box = "$5".into();
        form.production_time = "10 días naturales".into();
        form
    }

    #[test]
    fn boxes_round_up() {
        assert_eq!(boxes_for(0), 0);
        assert_eq!(boxes_for(1), 1);
        assert_eq!(boxes_for(20), 1);
        assert_eq!(boxes_for(21), 2);
        assert_eq!(boxes_for(40), 2);
    }

    #[test]
    fn order_example_totals() {
        let t = twenty_pair_form().totals();
        assert_eq!(t.total_pairs, 20);
        assert_eq!(t.total_boxes, 1);
        assert!(close(t.total_shipping_cost, 5.0));
        assert!(close(t.subtotal, 205.0));
        assert!(close(t.iva, 32.8));
        assert!(close(t.total, 237.8));
        assert!(close(t.deposit, 118.9));
    }

    #[test]
    fn tax_and_deposit_are_fixed_shares() {
        let mut form = twenty_pair_form();
        for (size, qty) in [(SizeLabel::S2, 3), (SizeLabel::S10, 41), (SizeLabel::S5, 7)] {
            form.sizes.set(size, qty);
            form.price_per_pair = format!("${}.75", qty);
            let t = form.totals();
            assert_eq!(t.iva, t.subtotal * 0.16);
            assert_eq!(t.deposit, t.total / 2.0);
            assert_eq!(t.total_boxes, boxes_for(t.total_pairs));
        }
    }

    #[test]
    fn empty_order_form_is_all_zero() {
        let t = OrderFormState::new(day(2024, 1, 1)).totals();
        assert_eq!(t, OrderTotals::default());
    }

    #[test]
    fn end_date_adds_production_days() {
        assert_eq!(end_date("2024-01-01", "10 días naturales"), "2024-01-11");
        assert_eq!(end_date("2024-02-25", "5 días naturales"), "2024-03-01");
        assert_eq!(end_date("2024-01-01", ""), "2024-01-01");
        assert_eq!(end_date("", "10 días naturales"), "");
    }

    #[test]
    fn end_date_out_of_range_keeps_start() {
        assert_eq!(end_date("2024-01-01", "200000000000 días naturales"), "2024-01-01");
        assert_eq!(end_date("2024-01-01", "9223372036854775807 días naturales"), "2024-01-01");
        assert_eq!(end_date("2024-01-01", "999999999 días naturales"), "2024-01-01");
    }

    #[test]
    fn shift_keeps_span() {
        assert_eq!(
            shift_end_date("2024-01-01", "2024-01-11", "2024-02-01").as_deref(),
            Some("2024-02-11")
        );
        assert_eq!(shift_end_date("bad", "2024-01-11", "2024-02-01"), None);
    }

    #[test]
    fn to_order_carries_defaults_and_end_date() {
        let order = twenty_pair_form().to_order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::ChooseOption);
        assert_eq!(order.invoice_status, InvoiceStatus::ChooseOption);
        assert_eq!(order.start_date, "2024-01-01");
        assert_eq!(order.end_date, "2024-01-11");
        assert!(order.comments.is_empty());
    }

    #[test]
    fn edit_and_copy_seed_the_form() {
        let order = twenty_pair_form().to_order();
        let edit = OrderFormState::from_order(&order);
        assert_eq!(edit.production_time, "10 días naturales");
        assert_eq!(edit.price_per_pair, "$10");
        assert_eq!(edit.order_date, "2024-01-01");
        assert_eq!(edit.totals(), twenty_pair_form().totals());

        let copy = OrderFormState::copy_of(&order, day(2024, 6, 3));
        assert_eq!(copy.order_date, "2024-06-03");
        assert_eq!(copy.sizes, order.sizes);
    }

    #[test]
    fn quote_boxes_follow_pairs_until_overridden() {
        let mut form = QuoteFormState::new();
        form.set_pairs("45");
        assert_eq!(form.boxes, "3");
        form.set_boxes("2");
        assert_eq!(form.totals().boxes, 2);
        form.set_pairs("45");
        assert_eq!(form.boxes, "2");
        form.set_pairs("10");
        assert_eq!(form.boxes, "1");
        form.set_pairs("");
        assert_eq!(form.boxes, "0");
    }

    #[test]
    fn quote_subtotal_excludes_shipping() {
        let mut form = QuoteFormState::new();
        form.set_pairs("20");
        form.price_per_pair = "$10".into();
        form.shipping_cost_per_box = "$5".into();
        let q = form.totals();
        assert!(close(q.total_shipping, 5.0));
        assert!(close(q.subtotal, 200.0));
        assert!(close(q.iva, 32.8));
        assert!(close(q.total, 237.8));

        let o = twenty_pair_form().totals();
        assert!(!close(q.subtotal, o.subtotal));
    }

    #[test]
    fn quote_round_trips_through_form() {
        let mut form = QuoteFormState::new();
        form.client_name = "Botas Norte".into();
        form.set_pairs("33");
        form.price_per_pair = "$12.50".into();
        form.shipping_cost_per_box = "$80".into();
        let quote = form.to_quote(day(2024, 5, 2));
        assert_eq!(quote.date, "2024-05-02");
        assert_eq!(quote.boxes, 2);

        let again = QuoteFormState::from_quote(&quote);
        assert_eq!(again.totals(), form.totals());
    }
}
