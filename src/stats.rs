//! Sales figures over the order history.

use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::Order;
use crate::parse::stored_date;
use crate::sizes::SizeLabel;

/// One of the year/month selectors: everything, one value, or an unreadable choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector {
    #[default]
    All,
    Only(i32),
    Unmatched,
}

impl Selector {
    fn accepts(self, value: i32) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(v) => v == value,
            Selector::Unmatched => false,
        }
    }

    /// Reads selector text: `"all"` (or blank), a number, or anything else as unmatched.
    pub fn from_text(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Selector::All;
        }
        s.parse().map(Selector::Only).unwrap_or(Selector::Unmatched)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesFilter {
    pub year: Selector,
    /// Calendar month, 1-12.
    pub month: Selector,
}

impl SalesFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn parse(year: &str, month: &str) -> Self {
        SalesFilter {
            year: Selector::from_text(year),
            month: Selector::from_text(month),
        }
    }

    /// Orders with an unreadable start date never match.
    pub fn matches(&self, order: &Order) -> bool {
        match stored_date(&order.start_date) {
            Some(d) => self.year.accepts(d.year()) && self.month.accepts(d.month() as i32),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesReport {
    pub order_count: usize,
    pub total_pairs: u64,
    pub total_revenue: f64,
    pub total_iva: f64,
    pub total_shipping: f64,
    pub total_deposit: f64,
    pub total_boxes: u64,
    /// Pairs per size, in size order.
    pub size_distribution: Vec<(SizeLabel, u64)>,
    /// Pairs per `YYYY-MM`, ascending.
    pub monthly_pairs: Vec<(String, u64)>,
    pub by_order_type: Vec<(String, u64)>,
    pub by_model: Vec<(String, u64)>,
    pub by_profile: Vec<(String, u64)>,
}

impl SalesReport {
    pub fn total_pairs_sold(&self) -> u64 {
        self.size_distribution.iter().map(|(_, n)| n).sum()
    }
}

fn ranked(counts: HashMap<&'static str, u64>) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> =
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

pub fn sales_report(orders: &[Order], filter: &SalesFilter) -> SalesReport {
    let mut report = SalesReport::default();
    let mut sizes = [0u64; 9];
    let mut monthly: BTreeMap<String, u64> = BTreeMap::new();
    let mut order_types: HashMap<&'static str, u64> = HashMap::new();
    let mut models: HashMap<&'static str, u64> = HashMap::new();
    let mut profiles: HashMap<&'static str, u64> = HashMap::new();

    for order in orders {
        let Some(date) = stored_date(&order.start_date) else {
            log::warn!("order {} has unreadable start date {:?}", order.id, order.start_date);
            continue;
        };
        if !filter.matches(order) {
            continue;
        }

        report.order_count += 1;
        report.total_pairs += order.total_pairs;
        report.total_revenue += order.total;
        report.total_iva += order.iva;
        report.total_shipping += order.total_shipping_cost;
        report.total_deposit += order.deposit;
        report.total_boxes += order.total_boxes;

        for (i, (_, qty)) in order.sizes.iter().enumerate() {
            sizes[i] += u64::from(qty);
        }

        let month_key = format!("{:04}-{:02}", date.year(), date.month());
        *monthly.entry(month_key).or_default() += order.total_pairs;

        if let Some(t) = order.order_type {
            *order_types.entry(t.as_str()).or_default() += 1;
        }
        if let Some(m) = order.model {
            *models.entry(m.as_str()).or_default() += 1;
        }
        if let Some(p) = order.profile {
            *profiles.entry(p.as_str()).or_default() += 1;
        }
    }

    report.size_distribution = SizeLabel::ALL.into_iter().zip(sizes).collect();
    report.monthly_pairs = monthly.into_iter().collect();
    report.by_order_type = ranked(order_types);
    report.by_model = ranked(models);
    report.by_profile = ranked(profiles);
    report
}

/// Years present in the history, newest first, for the year selector.
pub fn available_years(orders: &[Order]) -> Vec<i32> {
    let years: BTreeSet<i32> = orders
        .iter()
        .filter_map(|o| stored_date(&o.start_date))
        .map(|d| d.year())
        .collect();
    years.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_order;
    use crate::model::{OrderType, Profile, ShoeModel};

    fn order_on(id: i64, date: &str, pairs: u32) -> Order {
        let mut o = sample_order(id);
        o.start_date = date.into();
        o.sizes = [(SizeLabel::S5, pairs)].into_iter().collect();
        o.total_pairs = u64::from(pairs);
        o
    }

    #[test]
    fn empty_history_is_all_zero() {
        let report = sales_report(&[], &SalesFilter::all());
        assert_eq!(report.order_count, 0);
        assert_eq!(report.total_revenue, 0.0);
        assert_eq!(report.total_pairs_sold(), 0);
        assert!(report.size_distribution.iter().all(|(_, n)| *n == 0));
        assert!(report.monthly_pairs.is_empty());
        assert!(report.by_order_type.is_empty());
        assert!(report.by_model.is_empty());
        assert!(report.by_profile.is_empty());
    }

    #[test]
    fn totals_and_distributions() {
        let mut a = order_on(1, "2024-01-10", 20);
        let mut b = order_on(2, "2024-01-20", 30);
        let mut c = order_on(3, "2024-03-02", 10);
        b.model = Some(ShoeModel::Urban);
        c.model = Some(ShoeModel::Urban);
        c.profile = None;
        a.order_type = Some(OrderType::SampleKit);

        let report = sales_report(&[a, b, c], &SalesFilter::all());
        assert_eq!(report.order_count, 3);
        assert_eq!(report.total_pairs, 60);
        assert_eq!(report.total_pairs_sold(), 60);
        assert_eq!(report.size_distribution[3], (SizeLabel::S5, 60));
        assert_eq!(
            report.monthly_pairs,
            vec![("2024-01".to_string(), 50), ("2024-03".to_string(), 10)]
        );
        assert_eq!(
            report.by_model,
            vec![("URBAN".to_string(), 2), ("CASUAL".to_string(), 1)]
        );
        assert_eq!(
            report.by_order_type,
            vec![("PEDIDO".to_string(), 2), ("MUESTRA KIT".to_string(), 1)]
        );
        assert_eq!(report.by_profile, vec![(Profile::Ds.to_string(), 2)]);
        assert!((report.total_revenue - 3.0 * 237.8).abs() < 1e-9);
    }

    #[test]
    fn filters_by_year_and_month() {
        let orders = vec![
            order_on(1, "2023-12-31", 5),
            order_on(2, "2024-01-01", 7),
            order_on(3, "2024-02-01", 11),
        ];
        let jan = sales_report(&orders, &SalesFilter::parse("2024", "1"));
        assert_eq!(jan.order_count, 1);
        assert_eq!(jan.total_pairs, 7);

        let year = sales_report(&orders, &SalesFilter::parse("2024", "all"));
        assert_eq!(year.order_count, 2);

        let decembers = sales_report(&orders, &SalesFilter::parse("all", "12"));
        assert_eq!(decembers.total_pairs, 5);

        let nonsense = sales_report(&orders, &SalesFilter::parse("dos mil", "all"));
        assert_eq!(nonsense.order_count, 0);
    }

    #[test]
    fn bad_dates_are_excluded_not_fatal() {
        let orders = vec![order_on(1, "ayer", 9), order_on(2, "2024-04-04", 4)];
        let report = sales_report(&orders, &SalesFilter::all());
        assert_eq!(report.order_count, 1);
        assert_eq!(report.total_pairs, 4);
        assert_eq!(available_years(&orders), vec![2024]);
    }

    #[test]
    fn years_newest_first() {
        let orders = vec![
            order_on(1, "2022-05-01", 1),
            order_on(2, "2024-05-01", 1),
            order_on(3, "2022-07-01", 1),
        ];
        assert_eq!(available_years(&orders), vec![2024, 2022]);
    }
}
