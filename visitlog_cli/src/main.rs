use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use visitlog_core::report::Bucket;
use visitlog_core::*;

#[derive(Parser)]
#[command(name = "visitlog")]
#[command(about = "Facility visitor sign-in/sign-out log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the visitor log file if it does not exist
    Init,

    /// Register a visitor entering the facility
    Entry {
        #[arg(long)]
        name: String,

        /// National ID or similar document number
        #[arg(long)]
        personal_id: String,

        #[arg(long, default_value = "")]
        company: String,

        #[arg(long, default_value = "")]
        destination: String,
    },

    /// Register a visitor leaving the facility
    Exit {
        #[arg(long)]
        personal_id: String,

        /// Name shown in the confirmation message
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Show visitor statistics (default)
    Summary {
        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the JSON data feed (latest records and daily counts)
    Feed,

    /// List the most recent records
    Latest {
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    visitlog_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let store_path = match &cli.data_dir {
        Some(dir) => config.store_path_in(dir),
        None => config.store_path(),
    };
    let log = VisitLog::new(
        CsvStore::new(store_path),
        Arc::new(SystemClock),
        config.visits.exit_policy,
    );

    match cli.command {
        Some(Commands::Init) => cmd_init(&log),
        Some(Commands::Entry {
            name,
            personal_id,
            company,
            destination,
        }) => cmd_register(
            &log,
            VisitEvent::entry(name, personal_id, company, destination),
        ),
        Some(Commands::Exit { personal_id, name }) => {
            let name = if name.is_empty() { personal_id.clone() } else { name };
            cmd_register(&log, VisitEvent::exit(name, personal_id))
        }
        Some(Commands::Summary { json }) => cmd_summary(&log, &config, json),
        Some(Commands::Feed) => cmd_feed(&log, &config),
        Some(Commands::Latest { count }) => {
            cmd_latest(&log, count.unwrap_or(config.visits.latest_records))
        }
        None => cmd_summary(&log, &config, false),
    }
}

fn cmd_init(log: &VisitLog) -> Result<()> {
    if log.store().init()? {
        println!("✓ Created visitor log at {}", log.store().path().display());
    } else {
        println!("Visitor log already exists at {}", log.store().path().display());
    }
    Ok(())
}

fn cmd_register(log: &VisitLog, event: VisitEvent) -> Result<()> {
    let outcome = log.register(&event)?;
    if outcome.mutated() {
        println!("✓ {}", outcome);
    } else {
        println!("{}", outcome);
    }
    Ok(())
}

fn cmd_summary(log: &VisitLog, config: &Config, json: bool) -> Result<()> {
    let summary = log.summary(config.visits.top_companies);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  VISITOR LOG");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Total visits:      {}", summary.total_count);
    println!("  Visits today:      {}", summary.count_today);
    println!("  Currently present: {}", summary.present_count);

    if summary.is_empty() {
        println!();
        return Ok(());
    }

    print_buckets("Visits per day", &summary.by_day);
    print_buckets("Visits per destination", &summary.by_destination);
    print_buckets("Top companies", &summary.top_companies);
    print_buckets("Visits per hour", &summary.by_hour);
    println!();
    Ok(())
}

fn print_buckets(title: &str, buckets: &[Bucket]) {
    println!();
    println!("  {}", title);
    let widest = buckets.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    for bucket in buckets {
        println!(
            "    {:<width$}  {:>4}  {}",
            bucket.label,
            bucket.count,
            "▇".repeat(bucket.count.min(40)),
            width = widest
        );
    }
}

fn cmd_feed(log: &VisitLog, config: &Config) -> Result<()> {
    let value = feed_json(log.feed(config.visits.latest_records));
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_latest(log: &VisitLog, count: usize) -> Result<()> {
    let records = log.records()?;
    let latest = visitlog_core::stats::latest(&records, count);

    if latest.is_empty() {
        println!("No visits recorded yet.");
        return Ok(());
    }

    for record in latest {
        let exit = match (record.exit_date, record.exit_time) {
            (Some(date), Some(time)) => format!("{} {}", date, time),
            _ => "on-site".to_string(),
        };
        println!(
            "  #{:<4} {} ({}) {} → {}  in {} {}  out {}",
            record.id,
            record.name,
            record.personal_id,
            record.company,
            record.destination,
            record.entry_date,
            record.entry_time,
            exit
        );
    }
    Ok(())
}
