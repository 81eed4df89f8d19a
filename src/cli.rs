// src/cli.rs
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::{self, AreaLevel, BatchPlan, Combination, FailurePolicy};
use crate::cascade::StateLookup;
use crate::catalog::{Field, OptionSet};
use crate::config::options::{ExportOptions, ExportType, SiteConfig};
use crate::core::net::HttpTransport;
use crate::file::open_sink;
use crate::progress::Progress;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "sisab_scrape")]
#[command(about = "Export SISAB indicator reports for every unit, period, indicator and view")]
pub struct Args {
    /// Area level: nacional, regiao, uf or ibge
    #[arg(long, default_value = "ibge")]
    area: AreaLevel,

    /// One global file, or one file per combination
    #[arg(long, value_enum, default_value = "single")]
    mode: Mode,

    /// Output file (single) or directory (files)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Region or state value to include (repeatable; default all)
    #[arg(long = "unit")]
    units: Vec<String>,

    /// Municipality (IBGE) code to include, at the ibge level (repeatable)
    #[arg(long = "municipality")]
    municipalities: Vec<String>,

    #[arg(long = "period")]
    periods: Vec<String>,

    #[arg(long = "indicator")]
    indicators: Vec<String>,

    #[arg(long = "view")]
    views: Vec<String>,

    /// Record failed combinations and go on instead of stopping
    #[arg(long)]
    keep_going: bool,

    /// Print the options of one field and exit
    #[arg(long, value_enum)]
    list: Option<ListField>,

    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Single,
    Files,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ListField {
    Area,
    Region,
    State,
    Municipality,
    Indicator,
    Period,
    View,
}

/// Terminal progress bar for batch runs.
struct TermProgress {
    bar: ProgressBar,
}

impl TermProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }
}

impl Progress for TermProgress {
    fn begin(&mut self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn log(&mut self, msg: &str) {
        self.bar.println(msg);
    }

    fn item_done(&mut self, combo: &Combination) {
        self.bar.set_message(combo.describe());
        self.bar.inc(1);
    }

    fn item_failed(&mut self, combo: &Combination, error: &str) {
        self.bar.println(format!("FAILED {}: {error}", combo.describe()));
        self.bar.inc(1);
    }

    fn finish(&mut self) {
        self.bar.finish_with_message("done");
    }
}

fn print_options(options: &OptionSet) {
    for (value, label) in options.iter() {
        println!("{value}\t{label}");
    }
}

fn list(session: &mut Session<HttpTransport>, args: &Args, field: ListField) -> Result<()> {
    let one_shot = match field {
        ListField::Area => Some(Field::Area),
        ListField::Indicator => Some(Field::Index),
        ListField::Period => Some(Field::Period),
        ListField::View => Some(Field::View),
        _ => None,
    };
    if let Some(f) = one_shot {
        let options = session.options(f).ok_or_else(|| eyre!("no {f} options"))?;
        print_options(options);
        return Ok(());
    }

    session.select(Field::Area, args.area.code())?;
    match field {
        ListField::Region => print_options(session.refresh_regions()?),
        ListField::State => {
            let lookup = if args.area == AreaLevel::Municipality {
                StateLookup::ByMunicipality
            } else {
                StateLookup::ByState
            };
            print_options(session.refresh_states(lookup)?)
        }
        _ => {
            if args.units.is_empty() {
                return Err(eyre!("--list municipality needs at least one --unit <state>"));
            }
            session.refresh_states(StateLookup::ByMunicipality)?;
            session.select(Field::State, args.units.as_slice())?;
            print_options(session.refresh_municipalities()?)
        }
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    crate::log::init(args.log_file.as_deref())?;

    let mut session = Session::open(SiteConfig::default())?;

    if let Some(field) = args.list {
        return list(&mut session, &args, field);
    }

    let mut plan = BatchPlan::new(args.area);
    plan.units = args.units.clone();
    plan.municipalities = args.municipalities.clone();
    plan.periods = args.periods.clone();
    plan.indices = args.indicators.clone();
    plan.views = args.views.clone();
    if args.keep_going {
        plan.on_error = FailurePolicy::Continue;
    }

    let mut export = ExportOptions::new(match args.mode {
        Mode::Single => ExportType::SingleFile,
        Mode::Files => ExportType::PerCombination,
    });
    if let Some(out) = &args.out {
        export.set_path(out);
    }

    let mut sink = open_sink(&export)?;
    let mut progress = TermProgress::new();
    let summary = batch::run(&mut session, &plan, sink.as_mut(), Some(&mut progress))?;

    println!(
        "{} exported, {} skipped, {} failed -> {}",
        summary.exported,
        summary.skipped,
        summary.failed.len(),
        export.out_path().display()
    );
    for (combo, error) in &summary.failed {
        eprintln!("  {combo}: {error}");
    }
    Ok(())
}
