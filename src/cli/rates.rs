use super::ui;
use crate::core::config::AppConfig;
use crate::core::rates::RateProvider;
use crate::core::snapshot::RateSnapshot;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateSort {
    #[default]
    Code,
    Rate,
}

#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    pub sort: RateSort,
    pub descending: bool,
    pub filter: Option<String>,
    /// Pinned to the top of the table regardless of sort order.
    pub favorites: Vec<String>,
}

impl TableOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        TableOptions {
            favorites: config.watchlist.clone(),
            ..TableOptions::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub code: String,
    pub rate: f64,
    pub delta: Option<f64>,
    pub favorite: bool,
}

/// Turns a snapshot into display rows: filtered, favorites pinned first,
/// then sorted by the requested key.
pub fn build_rows(
    snapshot: &RateSnapshot,
    deltas: Option<&HashMap<String, f64>>,
    options: &TableOptions,
) -> Vec<RateRow> {
    let filter = options
        .filter
        .as_ref()
        .map(|needle| needle.to_uppercase());

    let mut rows: Vec<RateRow> = snapshot
        .rates
        .iter()
        .filter(|(code, _)| {
            filter
                .as_ref()
                .is_none_or(|needle| code.to_uppercase().contains(needle))
        })
        .map(|(code, rate)| RateRow {
            code: code.clone(),
            rate: *rate,
            delta: deltas.map(|deltas| deltas.get(code).copied().unwrap_or(0.0)),
            favorite: options
                .favorites
                .iter()
                .any(|favorite| favorite.eq_ignore_ascii_case(code)),
        })
        .collect();

    rows.sort_by(|a, b| {
        let key = match options.sort {
            RateSort::Code => a.code.cmp(&b.code),
            RateSort::Rate => a.rate.total_cmp(&b.rate),
        };
        let key = if options.descending { key.reverse() } else { key };
        b.favorite.cmp(&a.favorite).then(key)
    });

    rows
}

pub fn render_table(rows: &[RateRow], base: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {base})")),
        ui::header_cell("Change"),
    ]);

    for row in rows {
        let code = if row.favorite {
            format!("★ {}", row.code)
        } else {
            row.code.clone()
        };
        table.add_row(vec![
            Cell::new(code),
            ui::rate_cell(row.rate),
            ui::delta_cell(row.delta),
        ]);
    }

    table.to_string()
}

pub async fn run(
    provider: &dyn RateProvider,
    config: &AppConfig,
    options: TableOptions,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching rates...");
    let snapshot = provider.fetch_rates(&config.base_currency).await;
    spinner.finish_and_clear();
    let snapshot = snapshot?;

    let rows = build_rows(&snapshot, None, &options);

    println!(
        "Rates for {}\n",
        ui::style_text(&snapshot.base, ui::StyleType::Title)
    );
    println!("{}", render_table(&rows, &snapshot.base));
    println!(
        "\n{}",
        ui::style_text(
            &format!("As of {}", snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")),
            ui::StyleType::Subtle
        )
    );

    Ok(())
}
