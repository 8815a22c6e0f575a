//! Plain-text rendering of pages for the terminal.

use super::routes::Route;
use crate::schema::RecordSchema;
use crate::views::{ActivityFeed, DashboardMetrics, Listed, LoadState, PipelineBoard, RecordList};
use rust_decimal::Decimal;
use std::fmt::Write;

/// Formats an amount as whole dollars with thousands separators, e.g. `$12,500`.
#[must_use]
pub fn money(amount: Decimal) -> String {
    let rounded = amount.round().abs().trunc().to_string();
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, digit) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount.is_sign_negative() && !amount.round().is_zero() { "-" } else { "" };
    format!("{sign}${grouped}")
}

const PIPELINE_TITLE: &str = "Sales Pipeline";

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
}

fn load_failed(out: &mut String, message: &str) {
    let _ = writeln!(out, "{message}. Run the command again to retry.");
}

/// A record list in its current load state, filtered by the search term.
#[must_use]
pub fn list<E: Listed>(route: Route, list: &RecordList<E>) -> String {
    let mut out = String::new();
    heading(&mut out, route.title());
    match list.state() {
        LoadState::Loading => out.push_str("Loading...\n"),
        LoadState::Error(message) => load_failed(&mut out, message),
        LoadState::Empty => {
            let _ = writeln!(out, "{}\n[{}]", E::EMPTY_TITLE, E::EMPTY_ACTION);
        }
        LoadState::Loaded(_) => {
            let visible = list.visible();
            if visible.is_empty() {
                let _ = writeln!(out, "Nothing matches '{}'", list.search());
            }
            for record in visible {
                let _ = writeln!(
                    out,
                    "#{:<5} {:<28} {}",
                    record.id(),
                    record.display_name(),
                    record.search_fields().join(" | ")
                );
            }
        }
    }
    out
}

/// The pipeline board, one block per stage.
#[must_use]
pub fn pipeline(board: &PipelineBoard) -> String {
    let mut out = String::new();
    heading(&mut out, PIPELINE_TITLE);
    if board.is_empty() {
        out.push_str("No items in sales pipeline\n[Add Deal]\n");
        return out;
    }
    for column in board.columns() {
        let _ = writeln!(
            out,
            "\n{} ({}) {}",
            column.stage.label(),
            column.deals.len(),
            money(column.total)
        );
        for deal in column.deals {
            let _ = writeln!(
                out,
                "  #{:<5} {:<28} {:>10}  {}",
                deal.id,
                deal.display_name(),
                money(deal.value.unwrap_or_default()),
                board.contact_name(deal)
            );
        }
    }
    out
}

/// The pipeline page when its records could not be loaded.
#[must_use]
pub fn pipeline_failed(message: &str) -> String {
    let mut out = String::new();
    heading(&mut out, PIPELINE_TITLE);
    load_failed(&mut out, message);
    out
}

/// Recent activities.
#[must_use]
pub fn feed(feed: &ActivityFeed) -> String {
    let mut out = String::new();
    heading(&mut out, "Recent Activity");
    if feed.is_empty() {
        out.push_str("No activities yet\n");
    }
    for entry in feed.entries() {
        let when = entry
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "[{}] {}  {} - {}",
            entry.icon, when, entry.description, entry.contact_name
        );
    }
    out
}

/// Dashboard metric cards followed by the recent activity feed.
#[must_use]
pub fn dashboard(metrics: &DashboardMetrics, recent: &ActivityFeed) -> String {
    let mut out = String::new();
    heading(&mut out, Route::Dashboard.title());
    let _ = writeln!(out, "Total Revenue:     {}", money(metrics.total_revenue));
    let _ = writeln!(out, "Pipeline Value:    {}", money(metrics.pipeline_value));
    let _ = writeln!(out, "Contacts:          {}", metrics.contact_count);
    let _ = writeln!(out, "Companies:         {}", metrics.company_count);
    let _ = writeln!(out, "Deals:             {}", metrics.deal_count);
    let _ = writeln!(out, "Average Deal Size: {}", money(metrics.average_deal_size));
    let _ = writeln!(out, "Win Rate:          {}%", metrics.win_rate);
    out.push('\n');
    out.push_str(&feed(recent));
    out
}

/// The catch-all page listing every navigable route.
#[must_use]
pub fn not_found(path: &str) -> String {
    let mut out = String::new();
    heading(&mut out, Route::NotFound.title());
    let _ = writeln!(out, "Nothing lives at '{path}'. Try one of:");
    for route in Route::NAVIGATION {
        let _ = writeln!(out, "  {:<11} {}", route.path(), route.title());
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::schema::Contact;
    use crate::views::NameIndex;
    use serde_json::json;

    #[test]
    fn test_money() {
        assert_eq!(money(Decimal::from(0)), "$0");
        assert_eq!(money(Decimal::from(950)), "$950");
        assert_eq!(money(Decimal::from(12_500)), "$12,500");
        assert_eq!(money(Decimal::from(1_234_567)), "$1,234,567");
        assert_eq!(money(Decimal::from(-4_000)), "-$4,000");
    }

    #[tokio::test]
    async fn test_list_states() {
        let mut contacts = RecordList::<Contact>::new();
        assert!(list(Route::Contacts, &contacts).contains("Loading..."));

        let client = crate::test_utils::ScriptedClient::new();
        contacts.load(&crate::core::RecordService::new(&client, 100)).await;
        let text = list(Route::Contacts, &contacts);
        assert!(text.starts_with("Contacts\n========\n"));
        assert!(text.contains("No contacts found\n[Add Contact]"));
    }

    #[test]
    fn test_pipeline_lists_every_stage() {
        let deals = serde_json::from_value(json!([
            {"Id": 1, "title_c": "Renewal", "stage_c": "won", "value_c": 9500, "contact_id_c": {"Id": 2, "Name": "Dana Scully"}}
        ]))
        .unwrap();
        let text = pipeline(&PipelineBoard::new(deals, NameIndex::default()));
        assert!(text.contains("Won (1) $9,500"));
        assert!(text.contains("Qualified (0) $0"));
        assert!(text.contains("Dana Scully"));
    }

    #[test]
    fn test_not_found_lists_routes() {
        let text = not_found("/reports");
        assert!(text.starts_with("Page Not Found"));
        assert!(text.contains("/companies"));
    }
}
