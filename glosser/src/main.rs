use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use env_logger::Env;
use log::{debug, error, info, LevelFilter};

use glosser_lib::output::{format_summary, to_tsv};
use glosser_lib::{
    evaluate, Annotation, GlossError, IndexConfig, Indices, Ingestor, Pipeline, PipelineOptions,
    SamplingConfig,
};

const LONG_ABOUT: &str = "\
Dictionary-based glossing with inference for unseen forms.

Reads one query per line (the form runs up to the first whitespace or '#')
and appends tab-separated columns:
  BASE    first gloss recorded for the form
  CODE    D = dictionary match, I = inferred; inferred forms carry the letter
          of the merge strategy that fired:
            a  left and right agree
            b  left ends with right, or right starts with left (>1 chars)
            c  one side contains the other, cut after the first occurrence
            d  left's end overlaps right's start: concatenate
            e  as b, without the length floor
            f  known gloss starting with left and ending with right
            g  known gloss sharing the longest start of left and end of right
            h  left or right is a known gloss seen more than once
            i  some start of left or end of right is a known gloss
            j  known glosses starting with left or ending with right
  PREV    most frequent dictionary gloss(es)
  LEFT    gloss fragments from the longest known form prefix
  RIGHT   gloss fragments from the longest known form suffix
  MERGED  predicted gloss(es)
Ties are broken by total gloss frequency, then by brevity. Comment lines and
blank lines are copied unchanged.";

#[derive(Parser)]
#[command(name = "glosser", version, about = "Heuristic dictionary-based glossing", long_about = LONG_ABOUT)]
struct Cli {
    /// Dictionary TSV files: FORM<TAB>GLOSS[<TAB>FREQ[<TAB>...]].
    #[arg(required = true)]
    dicts: Vec<PathBuf>,

    /// Read queries from this file instead of stdin.
    #[arg(short, long, conflicts_with = "eval")]
    input: Option<PathBuf>,

    /// Withhold this fraction of dictionary forms and report accuracy on them
    /// instead of reading queries.
    #[arg(short, long, default_value_t = 0.0)]
    eval: f64,

    /// Dictionary column holding the gold gloss of withheld forms.
    #[arg(long, default_value_t = 1)]
    gold_column: usize,

    /// Seed for sampling withheld forms.
    #[arg(long)]
    seed: Option<u64>,

    /// Sample with a fixed seed when --seed is not given.
    #[arg(long)]
    deterministic: bool,

    /// Replace synthesized glosses by the nearest known gloss.
    #[arg(short, long)]
    post_edit: bool,

    /// Emit one JSON object per line instead of TSV.
    #[arg(long)]
    json: bool,

    /// Minimum form/gloss prefix length in the left affix index.
    #[arg(long, default_value_t = 2)]
    left_floor: usize,

    /// Minimum form/gloss suffix length in the right affix index.
    #[arg(long, default_value_t = 1)]
    right_floor: usize,

    /// More log output (repeat for trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Less log output (repeat for errors only).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

const DETERMINISTIC_SEED: u64 = 42;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(e.exit_code());
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match (verbose, quiet) {
        (0, 0) => None,
        (0, 1) => Some(LevelFilter::Warn),
        (0, _) => Some(LevelFilter::Error),
        (1, _) => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp(None);
    // Explicit flags override RUST_LOG.
    if let Some(level) = level {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn run(cli: &Cli) -> Result<(), GlossError> {
    let sampling = SamplingConfig {
        fraction: cli.eval,
        gold_column: cli.gold_column,
        seed: cli
            .seed
            .or(cli.deterministic.then_some(DETERMINISTIC_SEED)),
    };
    let config = IndexConfig {
        left_floor: cli.left_floor,
        right_floor: cli.right_floor,
    };
    config.validate()?;

    let mut ingestor = Ingestor::new(sampling.clone())?;
    for path in &cli.dicts {
        ingestor.ingest_file(path)?;
    }
    let (dictionary, held_out) = ingestor.finish()?;
    let indices = Indices::build(&dictionary, &config);

    let options = PipelineOptions {
        post_edit: cli.post_edit,
    };
    let mut pipeline = Pipeline::new(&dictionary, &indices, options);
    let mut out = BufWriter::new(io::stdout().lock());

    if sampling.is_active() {
        let summary = evaluate(&mut pipeline, &held_out, |a| {
            write_annotation(&mut out, a, cli.json)
        })?;
        writeln!(out, "{}", format_summary(&summary))?;
    } else {
        info!("annotating");
        let reader: Box<dyn BufRead> = match &cli.input {
            Some(path) => Box::new(BufReader::new(File::open(path)?)),
            None => Box::new(io::stdin().lock()),
        };
        for line in reader.lines() {
            let annotation = pipeline.annotate(&line?);
            write_annotation(&mut out, &annotation, cli.json)?;
        }
    }
    out.flush()?;

    if let Some(editor) = pipeline.post_editor() {
        debug!("post-editor resolved {} distinct glosses", editor.cached());
    }
    Ok(())
}

fn write_annotation<W: Write>(out: &mut W, a: &Annotation, json: bool) -> Result<(), GlossError> {
    if json {
        serde_json::to_writer(&mut *out, a).map_err(io::Error::from)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", to_tsv(a))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["glosser", "a.tsv", "b.tsv"]).unwrap();
        assert_eq!(cli.dicts.len(), 2);
        assert_eq!(cli.eval, 0.0);
        assert_eq!(cli.gold_column, 1);
        assert_eq!((cli.left_floor, cli.right_floor), (2, 1));
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_input_conflicts_with_eval() {
        let err = Cli::try_parse_from(["glosser", "-e", "0.1", "-i", "q.txt", "d.tsv"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        assert!(Cli::try_parse_from(["glosser", "-i", "q.txt", "d.tsv"]).is_ok());
        assert!(Cli::try_parse_from(["glosser", "-e", "0.1", "d.tsv"]).is_ok());
    }
}
