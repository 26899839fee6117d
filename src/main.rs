use anyhow::{bail, Context, Result};
use bref_boxes::dates::parse_iso_date;
use bref_boxes::{boxes_game, output, BrefSession, Config, Doubleheader, PageSource};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Table,
    Json,
    Parquet,
}

#[derive(Parser)]
#[command(name = "bref_boxes")]
#[command(about = "Fetch baseball-reference box scores as typed tables")]
struct Args {
    /// Team abbreviation as used in box score URLs (e.g. DET)
    #[arg(short, long)]
    team: String,

    /// Game date, YYYY-MM-DD (repeat for several games)
    #[arg(short, long, required = true)]
    date: Vec<String>,

    /// 0 for a single game, 1 or 2 for a doubleheader
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    doubleheader: u8,

    /// YAML file with session settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Output directory for Parquet files
    #[arg(short, long, default_value = "boxes")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bref_boxes=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = Config::load(args.config.as_deref())?;
    let session = BrefSession::new(&cfg).context("building HTTP session")?;
    info!(team = %args.team, dates = args.date.len(), game = args.doubleheader, "startup");

    let done = run(&session, &args)?;
    info!(games = done, "all done");
    Ok(())
}

/// Fetch and emit every requested date in parallel. One date failing does
/// not stop the others; the error is returned once all have finished.
fn run<S: PageSource + Sync>(source: &S, args: &Args) -> Result<usize> {
    let game = Doubleheader::try_from(args.doubleheader)?;

    // the session throttles itself, so parallel callers just queue up
    let results: Vec<(String, Result<()>)> = args
        .date
        .par_iter()
        .map(|date| {
            let res = boxes_game(source, &args.team, date, game)
                .with_context(|| format!("{} {}", args.team, date))
                .and_then(|batch| emit(args, date, game, &batch));
            (date.clone(), res)
        })
        .collect();

    let mut failed = 0;
    for (date, res) in &results {
        if let Err(e) = res {
            error!(%date, "{:#}", e);
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} games failed", results.len());
    }
    Ok(results.len())
}

fn emit(
    args: &Args,
    date: &str,
    game: Doubleheader,
    batch: &arrow::record_batch::RecordBatch,
) -> Result<()> {
    match args.format {
        Format::Table => {
            let table = output::render_table(batch)?;
            println!("{} {} (game {})\n{}", args.team, date, game, table);
        }
        Format::Json => {
            for row in output::to_json_rows(batch) {
                println!("{}", serde_json::to_string(&row)?);
            }
        }
        Format::Parquet => {
            let day = parse_iso_date(date)?;
            let name = format!("{}{}{}.parquet", args.team, day.format("%Y%m%d"), game);
            let path = args.output.join(name);
            output::write_parquet(batch, &path)?;
            info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
        }
    }
    Ok(())
}
