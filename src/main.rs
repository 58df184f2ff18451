use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use workshop_ledger::config::AppConfig;
use workshop_ledger::format::{
    format_currency, format_history_date, format_number, format_quote_date, production_time_label,
    status_tone, StatusTone,
};
use workshop_ledger::history::Direction;
use workshop_ledger::model::{
    parse_selection, InvoiceStatus, OrderPatch, OrderStatus, PaymentStatus, Profile,
};
use workshop_ledger::parse::lenient_currency;
use workshop_ledger::sizes::SizeLabel;
use workshop_ledger::stats::{available_years, SalesFilter, SalesReport};
use workshop_ledger::{Database, RecordKind, Workshop};

#[derive(Parser)]
#[command(name = "workshop-ledger")]
#[command(about = "Purchase orders, quotes and sales for the footwear workshop")]
struct Args {
    /// SQLite file holding the histories
    #[arg(long, env = "WORKSHOP_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the order history
    Orders,
    /// List the quote history
    Quotes,
    /// Compute and save a new order
    NewOrder {
        #[arg(long, default_value = "")]
        client: String,
        #[arg(long, default_value = "")]
        order_type: String,
        #[arg(long, default_value = "")]
        model: String,
        #[arg(long, default_value = "")]
        profile: String,
        /// Order date (YYYY-MM-DD), today if omitted
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        production_days: Option<u32>,
        #[arg(long, default_value = "")]
        price: String,
        #[arg(long, default_value = "")]
        shipping: String,
        /// Quantity per size, e.g. `--size "#7=5"`
        #[arg(long = "size")]
        sizes: Vec<String>,
    },
    /// Compute and save a new quote
    NewQuote {
        #[arg(long, default_value = "")]
        client: String,
        #[arg(long, default_value = "")]
        profile: String,
        #[arg(long, default_value = "")]
        pairs: String,
        #[arg(long, default_value = "")]
        price: String,
        #[arg(long, default_value = "")]
        shipping: String,
        /// Overrides the box count derived from pairs
        #[arg(long)]
        boxes: Option<String>,
        #[arg(long)]
        production_days: Option<u32>,
    },
    /// Change workflow fields of a stored order
    SetOrder {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        payment: Option<String>,
        #[arg(long)]
        invoice: Option<String>,
        #[arg(long)]
        deposit: Option<String>,
        #[arg(long)]
        comments: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
    },
    /// Move an order one place up or down the list
    MoveOrder {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        direction: String,
    },
    DeleteOrder {
        #[arg(long)]
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    DeleteQuote {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Sales statistics, optionally for one year and/or month
    Stats {
        #[arg(long, default_value = "all")]
        year: String,
        #[arg(long, default_value = "all")]
        month: String,
    },
}

// --- Helper Functions ---

fn tagged(label: &str) -> String {
    let tag = match status_tone(label) {
        StatusTone::Pending => '!',
        StatusTone::InProgress => '~',
        StatusTone::Packing => '>',
        StatusTone::Done => '+',
        StatusTone::Neutral => ' ',
    };
    format!("{tag}{label}")
}

fn print_orders(workshop: &Workshop) {
    if workshop.orders.is_empty() {
        println!("No hay pedidos guardados.");
        return;
    }
    for o in workshop.orders.list() {
        println!(
            "{:>14}  {:<16} {:<16} {:<24} {:>6} pares  {:>14}  {} | {} | {}",
            o.id,
            format_history_date(&o.start_date),
            format_history_date(&o.end_date),
            o.client_name,
            o.total_pairs,
            format_currency(o.total),
            tagged(o.status.as_str()),
            tagged(o.payment_status.as_str()),
            tagged(o.invoice_status.as_str()),
        );
    }
}

fn print_quotes(workshop: &Workshop) {
    if workshop.quotes.is_empty() {
        println!("No hay cotizaciones guardadas.");
        return;
    }
    for q in workshop.quotes.list() {
        println!(
            "{:>14}  {:<28} {:<24} {:>6} pares  {:>14}",
            q.id,
            format_quote_date(&q.date),
            q.client_name,
            q.pairs,
            format_currency(q.total),
        );
    }
}

fn print_distribution(title: &str, entries: &[(String, u64)]) {
    println!("{title}:");
    if entries.is_empty() {
        println!("  (sin datos)");
    }
    for (label, count) in entries {
        println!("  {label:<18} {count}");
    }
}

fn print_report(report: &SalesReport, years: &[i32]) {
    if report.order_count == 0 {
        println!("No hay pedidos para mostrar.");
        return;
    }
    println!("Pedidos:      {}", format_number(report.order_count as u64));
    println!("Pares:        {}", format_number(report.total_pairs));
    println!("Cajas:        {}", format_number(report.total_boxes));
    println!("Ventas:       {}", format_currency(report.total_revenue));
    println!("IVA:          {}", format_currency(report.total_iva));
    println!("Envío:        {}", format_currency(report.total_shipping));
    println!("Anticipos:    {}", format_currency(report.total_deposit));
    println!("Tallas:");
    for (size, count) in &report.size_distribution {
        println!("  {:<5} {count}", size.as_str());
    }
    println!("Pares por mes:");
    for (month, pairs) in &report.monthly_pairs {
        println!("  {month} {pairs}");
    }
    print_distribution("Tipo", &report.by_order_type);
    print_distribution("Modelo", &report.by_model);
    print_distribution("Perfil", &report.by_profile);
    let years: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    println!("Años disponibles: {}", years.join(", "));
}

fn parse_size_arg(raw: &str) -> Result<(SizeLabel, &str)> {
    let (label, qty) = raw
        .split_once('=')
        .with_context(|| format!("size {raw:?} must look like \"#7=5\""))?;
    Ok((label.parse()?, qty))
}

// --- Main Execution ---

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = AppConfig::resolve(args.db);

    let db = Database::open(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    let mut workshop = Workshop::open(db)?;

    match args.command {
        Command::Orders => print_orders(&workshop),
        Command::Quotes => print_quotes(&workshop),
        Command::NewOrder {
            client,
            order_type,
            model,
            profile,
            date,
            production_days,
            price,
            shipping,
            sizes,
        } => {
            let form = &mut workshop.order_form;
            form.client_name = client;
            form.order_type = parse_selection(&order_type)?;
            form.model = parse_selection(&model)?;
            form.profile = parse_selection(&profile)?;
            if let Some(date) = date {
                form.order_date = date;
            }
            form.production_time = production_days
                .map(|d| production_time_label(i64::from(d)))
                .unwrap_or_default();
            form.price_per_pair = price;
            form.shipping_per_box = shipping;
            for raw in &sizes {
                let (label, qty) = parse_size_arg(raw)?;
                form.sizes.set_from_input(label, qty);
            }
            let id = workshop.save_order()?;
            if let Some(o) = workshop.orders.get(id) {
                println!(
                    "Pedido {id}: {} pares, {} cajas, total {}, anticipo {}, entrega {}",
                    o.total_pairs,
                    o.total_boxes,
                    format_currency(o.total),
                    format_currency(o.deposit),
                    format_history_date(&o.end_date),
                );
            }
        }
        Command::NewQuote {
            client,
            profile,
            pairs,
            price,
            shipping,
            boxes,
            production_days,
        } => {
            let form = &mut workshop.quote_form;
            form.client_name = client;
            form.profile = Profile::parse_quote_option(&profile)?;
            form.set_pairs(&pairs);
            if let Some(boxes) = boxes {
                form.set_boxes(&boxes);
            }
            form.price_per_pair = price;
            form.shipping_cost_per_box = shipping;
            form.production_time = production_days
                .map(|d| production_time_label(i64::from(d)))
                .unwrap_or_default();
            let id = workshop.save_quote()?;
            if let Some(q) = workshop.quotes.get(id) {
                println!(
                    "Cotización {id}: subtotal {}, envío {}, IVA {}, total {}",
                    format_currency(q.subtotal),
                    format_currency(q.total_shipping),
                    format_currency(q.iva),
                    format_currency(q.total),
                );
            }
        }
        Command::SetOrder {
            id,
            status,
            payment,
            invoice,
            deposit,
            comments,
            start_date,
        } => {
            let patch = OrderPatch {
                status: status.map(|s| s.parse::<OrderStatus>()).transpose()?,
                payment_status: payment.map(|s| s.parse::<PaymentStatus>()).transpose()?,
                invoice_status: invoice.map(|s| s.parse::<InvoiceStatus>()).transpose()?,
                deposit: deposit.map(|d| lenient_currency(&d)),
                comments,
                start_date,
                ..Default::default()
            };
            workshop.update_order(id, patch)?;
            println!("Pedido {id} actualizado.");
        }
        Command::MoveOrder { id, direction } => {
            let direction: Direction = direction.parse()?;
            if workshop.reorder_order(id, direction)? {
                println!("Pedido {id} movido ({direction}).");
            } else {
                println!("Pedido {id} ya está en el extremo de la lista.");
            }
        }
        Command::DeleteOrder { id, yes } => delete(&mut workshop, RecordKind::Order, id, yes)?,
        Command::DeleteQuote { id, yes } => delete(&mut workshop, RecordKind::Quote, id, yes)?,
        Command::Stats { year, month } => {
            let report = workshop.sales_report(&SalesFilter::parse(&year, &month));
            print_report(&report, &available_years(workshop.orders.list()));
        }
    }

    Ok(())
}

fn delete(workshop: &mut Workshop, kind: RecordKind, id: i64, confirmed: bool) -> Result<()> {
    workshop.request_deletion(kind, id);
    if !confirmed {
        workshop.cancel_deletion();
        bail!("refusing to delete {kind} {id} without --yes");
    }
    workshop.confirm_deletion()?;
    println!("Eliminado: {kind} {id}");
    Ok(())
}
