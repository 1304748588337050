use anyhow::Context;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tunestats::config;
use tunestats::history;
use tunestats::model::GroupingKey;
use tunestats::report::ListeningReport;
use tunestats::stats::DateRange;

#[derive(Debug, Default)]
struct CliArgs {
    from: Option<String>,
    to: Option<String>,
    year: Option<i32>,
    group: Option<GroupingKey>,
    top: Option<usize>,
    utc_offset_minutes: Option<i32>,
    json: bool,
    save_config: bool,
    paths: Vec<PathBuf>,
}

impl CliArgs {
    fn range(&self) -> anyhow::Result<DateRange> {
        if let Some(year) = self.year {
            if self.from.is_some() || self.to.is_some() {
                anyhow::bail!("--year cannot be combined with --from/--to");
            }
            return DateRange::year(year);
        }
        DateRange::parse_bounds(
            self.from.as_deref().unwrap_or_default(),
            self.to.as_deref().unwrap_or_default(),
        )
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tunestats=warn".into()),
        )
        .init();

    let args = parse_args(std::env::args().skip(1).collect())?;

    let mut config = config::load_config()?;
    if let Some(top) = args.top {
        config.top_n = top;
    }
    if let Some(group) = args.group {
        config.default_grouping = group;
    }
    if let Some(minutes) = args.utc_offset_minutes {
        config.utc_offset_minutes = Some(minutes);
    }
    if args.save_config {
        config::save_config(&config)?;
        info!(path = %config::config_path()?.display(), "saved config");
        if args.paths.is_empty() {
            return Ok(());
        }
    }

    if args.paths.is_empty() {
        anyhow::bail!("no export files given (see --help)");
    }

    let range = args.range()?;
    let offset = config::resolve_offset(&config)?;
    let batch = history::load_exports(&args.paths, offset)?;
    if batch.files.is_empty() {
        anyhow::bail!("no .json exports found in the given paths");
    }
    info!(
        files = batch.files.len(),
        events = batch.events.len(),
        malformed_records = batch.malformed_records,
        "history loaded"
    );

    let report =
        ListeningReport::build(&batch.events, range, config.default_grouping, config.top_n);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--from" => out.from = Some(flag_value(&args, &mut index, "--from")?),
            "--to" => out.to = Some(flag_value(&args, &mut index, "--to")?),
            "--year" => {
                let value = flag_value(&args, &mut index, "--year")?;
                out.year = Some(
                    value
                        .parse()
                        .with_context(|| format!("--year expects a year, got {value}"))?,
                );
            }
            "--group" => {
                let value = flag_value(&args, &mut index, "--group")?;
                out.group = Some(value.parse()?);
            }
            "--top" => {
                let value = flag_value(&args, &mut index, "--top")?;
                out.top = Some(
                    value
                        .parse()
                        .with_context(|| format!("--top expects a count, got {value}"))?,
                );
            }
            "--utc-offset" => {
                let value = flag_value(&args, &mut index, "--utc-offset")?;
                out.utc_offset_minutes = Some(
                    value
                        .parse()
                        .with_context(|| format!("--utc-offset expects minutes, got {value}"))?,
                );
            }
            "--json" => out.json = true,
            "--save-config" => out.save_config = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with("--") => anyhow::bail!("unknown argument {other}"),
            path => out.paths.push(PathBuf::from(path)),
        }
        index += 1;
    }
    Ok(out)
}

fn flag_value(args: &[String], index: &mut usize, flag: &str) -> anyhow::Result<String> {
    *index += 1;
    let Some(value) = args.get(*index) else {
        anyhow::bail!("{flag} requires a value");
    };
    if value.trim().is_empty() {
        anyhow::bail!("{flag} cannot be empty");
    }
    Ok(value.trim().to_string())
}

fn print_help() {
    println!("tunestats [options] <export.json | folder>...");
    println!("  --from YYYY-MM-DD     First day to include");
    println!("  --to YYYY-MM-DD       Last day to include");
    println!("  --year YYYY           Shortcut for a whole calendar year");
    println!("  --group KEY           Ranking key: track, album or artist");
    println!("  --top N               Number of ranked entries (default 10)");
    println!("  --utc-offset MINUTES  Offset for naive timestamps and hours");
    println!("  --json                Print the report as JSON");
    println!("  --save-config         Store --group/--top/--utc-offset as defaults");
}
