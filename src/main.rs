use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use sales_metrics::{
    aggregate_by_time, classify_stock, load_records, logging, normalize_items,
    normalize_transactions, top_entities, Granularity, InventoryItem, MetricsEngine,
    RankMetric, ReportConfig, TransactionRecord,
};

const USAGE: &str = "\
sales-metrics - sales and inventory dashboard metrics

USAGE:
    sales-metrics report --sales <file> [--inventory <file>] [--config <file>] [--json]
    sales-metrics trend  --sales <file> [--granularity day|month] [--json]
    sales-metrics top    --sales <file> [--metric revenue|quantity] [--limit N] [--json]
    sales-metrics stock  --inventory <file> [--threshold N] [--json]

Input files are .json (array or {\"data\": [...]}) or .csv with headers.
Environment: SALES_METRICS_LOW_STOCK, SALES_METRICS_RANK_LIMIT,
SALES_METRICS_GRANULARITY, RUST_LOG.";

/// `--key value` options and bare `--flag`s after the subcommand
struct CliArgs {
    command: String,
    options: HashMap<String, String>,
    json: bool,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let command = args.get(1).cloned().unwrap_or_else(|| "help".to_string());
        let mut options = HashMap::new();
        let mut json = false;

        let mut rest = args.iter().skip(2);
        while let Some(arg) = rest.next() {
            match arg.strip_prefix("--") {
                Some("json") => json = true,
                Some(key) => {
                    let value = rest
                        .next()
                        .with_context(|| format!("Missing value for --{}", key))?;
                    options.insert(key.to_string(), value.clone());
                }
                None => bail!("Unexpected argument '{}'", arg),
            }
        }

        Ok(CliArgs {
            command,
            options,
            json,
        })
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.options.get(key).map(PathBuf::from)
    }

    fn required_path(&self, key: &str) -> Result<PathBuf> {
        self.path(key)
            .with_context(|| format!("--{} <file> is required for '{}'", key, self.command))
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.options.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| anyhow::anyhow!("Invalid value for --{}: {}", key, e)),
        }
    }

    /// Flag value, falling back to the configured default
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parsed(key)?.unwrap_or(default))
    }
}

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = env::args().collect();
    let cli = CliArgs::parse(&args)?;

    // Flags win over SALES_METRICS_* variables, which win over built-in defaults
    let defaults = ReportConfig::default().with_env_overrides();

    match cli.command.as_str() {
        "report" => run_report(&cli),
        "trend" => run_trend(&cli, &defaults),
        "top" => run_top(&cli, &defaults),
        "stock" => run_stock(&cli, &defaults),
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("{}", USAGE);
            bail!("Unknown command '{}'", other)
        }
    }
}

fn load_sales(path: &Path) -> Result<Vec<TransactionRecord>> {
    let raw = load_records(path)?;
    Ok(normalize_transactions(&raw).records)
}

fn load_inventory(path: &Path) -> Result<Vec<InventoryItem>> {
    let raw = load_records(path)?;
    Ok(normalize_items(&raw).records)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_report(cli: &CliArgs) -> Result<()> {
    let config = match cli.path("config") {
        Some(path) => ReportConfig::from_path(&path)?,
        None => ReportConfig::default(),
    }
    .with_env_overrides();

    let records = load_sales(&cli.required_path("sales")?)?;
    let items = match cli.path("inventory") {
        Some(path) => load_inventory(&path)?,
        None => Vec::new(),
    };

    let engine = MetricsEngine::with_config(config);
    let report = engine.report(&records, &items);

    if cli.json {
        return print_json(&report);
    }

    let summary = &report.summary;
    println!("📊 Sales Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", summary.summary_line());
    println!("  Revenue:        ${:.2}", summary.total_revenue);
    println!("  Cost:           ${:.2}", summary.total_cost);
    match (summary.total_profit, summary.profit_margin) {
        (Some(profit), Some(margin)) => {
            println!("  Profit:         ${:.2} ({:.1}%)", profit, margin)
        }
        _ => println!("  Profit:         n/a (no cost data)"),
    }
    println!("  Avg. sale:      ${:.2}", summary.average_transaction_value);
    println!("  Cost coverage:  {:?}", summary.cost_coverage);

    println!("\n🏆 Top sellers");
    for (rank, entry) in summary.top_entities.iter().enumerate() {
        println!("  {}. {:<30} {:>12.2}", rank + 1, entry.name, entry.metric);
    }

    println!("\n📈 Trend by {}", report.granularity);
    for bucket in &report.trend {
        println!("  {:<12} ${:>12.2}", bucket.key, bucket.sum);
    }

    if !items.is_empty() {
        let counts = report.stock_counts;
        println!("\n📦 Stock");
        println!(
            "  {} out of stock, {} low, {} healthy",
            counts.out_of_stock, counts.low_stock, counts.healthy
        );
        for item in &summary.low_stock {
            println!("  ⚠️  {} ({}): {} left", item.name, item.sku, item.stock);
        }
        for item in &report.out_of_stock {
            println!("  ❌ {} ({}): out of stock", item.name, item.sku);
        }
        println!(
            "  Stock value: ${:.2} retail / ${:.2} cost",
            report.valuation.retail_value, report.valuation.cost_value
        );
    }

    Ok(())
}

fn run_trend(cli: &CliArgs, defaults: &ReportConfig) -> Result<()> {
    let granularity = cli.parsed_or::<Granularity>("granularity", defaults.granularity)?;
    let records = load_sales(&cli.required_path("sales")?)?;
    let trend = aggregate_by_time(&records, granularity);

    if cli.json {
        return print_json(&trend);
    }
    for bucket in &trend {
        println!("{:<12} {:>12.2}", bucket.key, bucket.sum);
    }
    Ok(())
}

fn run_top(cli: &CliArgs, defaults: &ReportConfig) -> Result<()> {
    let metric = cli.parsed_or::<RankMetric>("metric", defaults.rank_metric)?;
    let limit = cli.parsed_or::<usize>("limit", defaults.rank_limit)?;
    let records = load_sales(&cli.required_path("sales")?)?;
    let top = top_entities(&records, metric, limit);

    if cli.json {
        return print_json(&top);
    }
    for (rank, entry) in top.iter().enumerate() {
        println!("{:>3}. {:<30} {:>12.2}", rank + 1, entry.name, entry.metric);
    }
    Ok(())
}

fn run_stock(cli: &CliArgs, defaults: &ReportConfig) -> Result<()> {
    let threshold = cli.parsed_or::<u64>("threshold", defaults.low_stock_threshold)?;
    let items = load_inventory(&cli.required_path("inventory")?)?;
    let classification = classify_stock(&items, threshold);

    if cli.json {
        return print_json(&classification);
    }

    let counts = classification.counts();
    println!(
        "Threshold {}: {} out of stock, {} low, {} healthy",
        threshold, counts.out_of_stock, counts.low_stock, counts.healthy
    );
    for item in &classification.out_of_stock {
        println!("  OUT  {:<30} {:>6}", item.name, item.stock);
    }
    for item in &classification.low_stock {
        println!("  LOW  {:<30} {:>6}", item.name, item.stock);
    }
    Ok(())
}
