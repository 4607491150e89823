use super::rates::{TableOptions, build_rows, render_table};
use super::ui;
use crate::core::animate::CounterAnimator;
use crate::core::cache::RateCache;
use crate::core::config::AppConfig;
use crate::core::convert::Converter;
use crate::core::poller::{PollState, RatePoller};
use crate::core::rates::RateProvider;
use anyhow::Result;
use console::Term;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Conversion pair displayed as an animated counter above the table.
pub struct WatchPair {
    pub amount: f64,
    pub target: String,
}

/// Live view: polls rates on the configured interval, redraws the table on
/// every refresh and animates the converted amount between values.
/// Runs until Ctrl-C, then tears the poller down.
pub async fn run(
    provider: Arc<dyn RateProvider>,
    config: &AppConfig,
    pair: Option<WatchPair>,
    options: TableOptions,
) -> Result<()> {
    let cache = RateCache::new();
    let poller = RatePoller::new(provider, cache.clone());
    let converter = Converter::new(cache.clone());
    let mut animator = CounterAnimator::new(0.0, config.animation_duration());

    poller.start(&config.base_currency, config.refresh_interval());
    let mut state_rx = poller.subscribe();

    let term = Term::stdout();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    let mut drawn_lines = 0usize;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                if let Some(pair) = &pair {
                    let converted = converter.convert(pair.amount, &pair.target).await;
                    if converted != animator.target() {
                        animator.animate_to(converted, Instant::now());
                    }
                }
                let deltas = collect_deltas(&cache, &state).await;
                drawn_lines = redraw(
                    &term,
                    config,
                    &state,
                    &deltas,
                    pair.as_ref(),
                    &mut animator,
                    &options,
                    drawn_lines,
                )?;
            }
            _ = frames.tick(), if animator.is_animating() => {
                let state = state_rx.borrow().clone();
                let deltas = collect_deltas(&cache, &state).await;
                drawn_lines = redraw(
                    &term,
                    config,
                    &state,
                    &deltas,
                    pair.as_ref(),
                    &mut animator,
                    &options,
                    drawn_lines,
                )?;
            }
        }
    }

    poller.stop();
    debug!("Watch loop finished");
    Ok(())
}

async fn collect_deltas(cache: &RateCache, state: &PollState) -> HashMap<String, f64> {
    let mut deltas = HashMap::new();
    if let Some(snapshot) = &state.snapshot {
        for code in snapshot.rates.keys() {
            deltas.insert(code.clone(), cache.delta(code).await);
        }
    }
    deltas
}

#[allow(clippy::too_many_arguments)]
fn redraw(
    term: &Term,
    config: &AppConfig,
    state: &PollState,
    deltas: &HashMap<String, f64>,
    pair: Option<&WatchPair>,
    animator: &mut CounterAnimator,
    options: &TableOptions,
    drawn_lines: usize,
) -> Result<usize> {
    let mut output = String::new();

    let updated = state
        .last_updated
        .map(|at| at.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    let mut header = format!(
        "Rates for {}, updated {updated}",
        ui::style_text(&config.base_currency, ui::StyleType::Title)
    );
    if state.is_loading {
        header.push_str(&ui::style_text(" (refreshing...)", ui::StyleType::Subtle));
    }
    output.push_str(&header);
    output.push('\n');

    if let Some(error) = &state.last_error {
        output.push_str(&ui::style_text(
            &format!("Last fetch failed: {error}"),
            ui::StyleType::Error,
        ));
        output.push('\n');
    }

    if let Some(pair) = pair {
        let displayed = animator.tick(Instant::now());
        output.push_str(&format!(
            "{} {} = {} {}\n",
            pair.amount,
            config.base_currency,
            ui::style_text(&format!("{displayed:.2}"), ui::StyleType::ResultValue),
            pair.target
        ));
    }

    if let Some(snapshot) = &state.snapshot {
        let rows = build_rows(snapshot, Some(deltas), options);
        output.push_str(&render_table(&rows, &snapshot.base));
        output.push('\n');
    } else {
        output.push_str(&ui::style_text("Waiting for rates...", ui::StyleType::Subtle));
        output.push('\n');
    }

    term.clear_last_lines(drawn_lines)?;
    let line_count = output.lines().count();
    term.write_str(&output)?;
    Ok(line_count)
}
