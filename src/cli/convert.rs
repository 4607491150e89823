use super::ui;
use crate::core::cache::RateCache;
use crate::core::config::AppConfig;
use crate::core::convert::Converter;
use crate::core::rates::RateProvider;
use anyhow::Result;

pub async fn run(
    provider: &dyn RateProvider,
    config: &AppConfig,
    amount: f64,
    target: &str,
) -> Result<()> {
    let base = &config.base_currency;

    let spinner = ui::new_spinner("Fetching rates...");
    let snapshot = provider.fetch_rates(base).await;
    spinner.finish_and_clear();
    let snapshot = snapshot?;

    let known_target = snapshot.rate(target).is_some() || target == base;

    let cache = RateCache::new();
    cache.update(snapshot).await;
    let converter = Converter::new(cache);
    let converted = converter.convert(amount, target).await;

    println!(
        "{amount} {base} = {} {target}",
        ui::style_text(&format!("{converted:.2}"), ui::StyleType::ResultValue)
    );
    if !known_target {
        println!(
            "{}",
            ui::style_text(
                &format!("No rate available for {target}, showing 1:1"),
                ui::StyleType::Subtle
            )
        );
    }

    Ok(())
}
