//! stitch
//!
//! Command line tool to resolve protein groups of a tab-separated PSM table,
//! and to summarize it into protein and peptide tables.
//!
//! Column names and filter rules can be read from a JSON config file, and
//! command line flags take precedence over it:
//! ```json
//! {
//!   "score_column": "MSGFScore",
//!   "confidence_column": "PSM q-value",
//!   "filters": ["confidence < 0.01", "exclude_protein = DECOY_"]
//! }
//! ```
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use rusqlite::Connection;
use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;
use stitch_proteomics::{run_batch, writer, Config, Dataset, Error, Filter, Psm};

#[derive(Parser, Debug)]
#[command(name = "stitch", version, about = "Protein grouping of PSM tables")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate a PSM table with master proteins and protein group content
    Proteingroup(Options),
    /// Write one row per protein group
    Prottable(Options),
    /// Write one row per peptide, from its best scoring PSM
    Peptable(Options),
}

#[derive(Args, Debug)]
struct Options {
    /// PSM table to read
    #[arg(short = 'i', long)]
    input: PathBuf,
    /// Directory to write output to
    #[arg(short = 'd', long, default_value = ".")]
    outdir: PathBuf,
    /// SQLite file to store the batch in. Defaults to an in-memory database
    #[arg(long)]
    dbfile: Option<PathBuf>,
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Filter rule, e.g. "confidence < 0.01". May be repeated
    #[arg(long = "filter")]
    filters: Vec<String>,
    /// Confidence column name or pattern
    #[arg(long)]
    confcol: Option<String>,
    /// Integer score column name or pattern
    #[arg(long)]
    scorecol: Option<String>,
    /// Input has one protein per line
    #[arg(long)]
    unroll: bool,
}

impl Options {
    fn config(&self) -> Result<Config, Error> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if let Some(col) = &self.confcol {
            config.confidence_column = Some(col.clone());
        }
        if let Some(col) = &self.scorecol {
            config.score_column = col.clone();
        }
        config.unroll |= self.unroll;
        config.filters.extend(self.filters.iter().cloned());
        Ok(config)
    }

    fn outpath(&self, suffix: &str) -> PathBuf {
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "psms".into());
        self.outdir.join(format!("{}_{}.txt", stem, suffix))
    }

    fn group(&self, config: &Config, psms: &[Psm], filter: &Filter) -> Result<Dataset, Error> {
        let mut conn = match &self.dbfile {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        run_batch(&mut conn, psms, filter, config.unroll)
    }
}

fn run(command: &Command) -> Result<PathBuf, Error> {
    let opts = match command {
        Command::Proteingroup(opts) | Command::Prottable(opts) | Command::Peptable(opts) => opts,
    };
    let config = opts.config()?;
    let filter = config.filter()?;

    let input = fs::read_to_string(&opts.input)?;
    let parser = stitch_proteomics::Parser::new(&input, &config)?;
    let header = parser.header().clone();
    let psms = parser.collect::<Result<Vec<_>, _>>()?;
    info!("Read {} PSM rows from {}", psms.len(), opts.input.display());

    fs::create_dir_all(&opts.outdir)?;
    let outpath = match command {
        Command::Proteingroup(_) => {
            let dataset = opts.group(&config, &psms, &filter)?;
            let outpath = opts.outpath("proteingroups");
            let out = BufWriter::new(fs::File::create(&outpath)?);
            writer::write_psm_table(out, &header, &psms, &dataset)?;
            outpath
        }
        Command::Prottable(_) => {
            let dataset = opts.group(&config, &psms, &filter)?;
            let outpath = opts.outpath("proteins");
            let out = BufWriter::new(fs::File::create(&outpath)?);
            writer::write_protein_table(out, &dataset)?;
            outpath
        }
        Command::Peptable(_) => {
            let outpath = opts.outpath("peptides");
            let out = BufWriter::new(fs::File::create(&outpath)?);
            writer::write_peptide_table(out, &header, &psms, &filter)?;
            outpath
        }
    };
    Ok(outpath)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let start = Instant::now();
    match run(&cli.command) {
        Ok(path) => info!(
            "Wrote {} in {:0.2} seconds",
            path.display(),
            start.elapsed().as_secs_f64()
        ),
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    }
}
