// src/cli.rs
use std::{fs, path::{Path, PathBuf}, time::Duration};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};

use crate::{
    bridge::{query_url, Bridge, FetchOutcome},
    config::options::Options,
    coordinator::CardId,
    counter::UsageCounter,
    extract::{self, ScanReport, Verdict},
    progress::Progress,
    session::{outcome_label, Session},
    watcher::PageWatcher,
};

#[derive(Parser, Debug)]
#[command(name = "flyontime", version, about = "On-time predictions for a saved flight-search results page")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Per-run overrides on top of the options file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Options file (default: .store/options.json)
    #[arg(long, global = true)]
    pub options: Option<PathBuf>,

    /// Prediction service base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Fetch worker threads
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Per-request timeout, seconds
    #[arg(long, global = true)]
    pub request_timeout: Option<u64>,

    /// Don't bump the usage counter
    #[arg(long, global = true)]
    pub no_count: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the cards on a page and whether each can get a prediction
    Scan {
        page: PathBuf,
        /// Print the scan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch predictions for every eligible card and write the augmented page
    Predict {
        page: PathBuf,
        /// Where to write the page (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Give up waiting after this many seconds
        #[arg(long, default_value_t = 60)]
        wait: u64,
    },
    /// Re-scan the page whenever the file changes
    Watch {
        page: PathBuf,
        /// Also fetch predictions after each change
        #[arg(long)]
        predict: bool,
    },
    /// Show or reset the usage counter
    Counter {
        #[arg(long)]
        reset: bool,
    },
}

impl Overrides {
    fn apply(&self, opts: &mut Options) {
        if let Some(base) = &self.api_base {
            opts.api_base = base.clone();
        }
        if let Some(n) = self.workers {
            opts.workers = n;
        }
        if let Some(t) = self.request_timeout {
            opts.request_timeout_secs = t;
        }
        if self.no_count {
            opts.count_usage = false;
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let options_path = cli.overrides.options.clone().unwrap_or_else(Options::default_path);
    let mut opts = Options::load(&options_path)
        .wrap_err_with(|| format!("reading {}", options_path.display()))?;
    cli.overrides.apply(&mut opts);
    logd!("CLI: {:?}", cli.command);

    match cli.command {
        Command::Scan { page, json } => scan(&page, json, &opts),
        Command::Predict { page, out, wait } => predict(&page, out, Duration::from_secs(wait), &opts),
        Command::Watch { page, predict } => watch(&page, predict, &opts),
        Command::Counter { reset } => counter(reset),
    }
}

fn open(page: &Path, opts: &Options) -> Result<Session> {
    let bridge = Bridge::from_options(opts)?;
    let session = Session::open(page, bridge).wrap_err_with(|| format!("opening {}", page.display()))?;
    Ok(if opts.count_usage {
        session.with_counter(UsageCounter::new(UsageCounter::default_path()))
    } else {
        session
    })
}

fn scan(page: &Path, json: bool, opts: &Options) -> Result<()> {
    let html = fs::read_to_string(page).wrap_err_with(|| format!("reading {}", page.display()))?;
    let doc = crate::core::Document::parse(&html);
    let report = extract::scan(&doc);

    if json {
        let verdicts: Vec<&Verdict> = report.cards.iter().map(|c| &c.verdict).collect();
        println!("{}", serde_json::to_string_pretty(&verdicts)?);
    } else {
        print_report(&report, opts);
    }
    Ok(())
}

fn print_report(report: &ScanReport, opts: &Options) {
    let leg = if report.trip.is_return_leg { "return" } else { "outbound" };
    println!("{leg} leg, date {}", report.trip.leg_date().unwrap_or("?"));
    for card in &report.cards {
        match &card.verdict {
            Verdict::Eligible(q) => println!("{:>3}  ok    {}", card.index, query_url(&opts.api_base, q)),
            Verdict::Ineligible(why) => println!("{:>3}  skip  {why}", card.index),
            Verdict::Malformed(why) => println!("{:>3}  bad   {why}", card.index),
        }
    }
    println!("{} cards, {} eligible", report.cards.len(), report.count_eligible());
}

struct StderrProgress {
    total: usize,
    done: usize,
}

impl Progress for StderrProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        eprintln!("fetching {total} predictions");
    }
    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
    fn item_done(&mut self, card: CardId, outcome: &FetchOutcome) {
        self.done += 1;
        eprintln!("[{}/{}] card {}: {}", self.done, self.total, card.index, outcome_label(outcome));
    }
    fn finish(&mut self) {
        eprintln!("done ({}/{})", self.done, self.total);
    }
}

fn predict(page: &Path, out: Option<PathBuf>, wait: Duration, opts: &Options) -> Result<()> {
    let mut session = open(page, opts)?;
    let mut progress = StderrProgress { total: 0, done: 0 };
    session.predict_all(wait, &mut progress);

    let html = session.to_html();
    match out {
        Some(path) => fs::write(&path, html).wrap_err_with(|| format!("writing {}", path.display()))?,
        None => println!("{html}"),
    }
    Ok(())
}

fn watch(page: &Path, predict: bool, opts: &Options) -> Result<()> {
    let mut session = open(page, opts)?;
    let mut watcher = PageWatcher::watch(page, opts.debounce())?;
    print_report(session.report(), opts);

    let mut progress = StderrProgress { total: 0, done: 0 };
    if predict {
        session.predict_all(Duration::from_secs(60), &mut progress);
    }

    while watcher.wait() {
        session.reload()?;
        eprintln!("page changed; cards reset");
        print_report(session.report(), opts);
        if predict {
            progress = StderrProgress { total: 0, done: 0 };
            session.predict_all(Duration::from_secs(60), &mut progress);
        }
    }
    Ok(())
}

fn counter(reset: bool) -> Result<()> {
    let counter = UsageCounter::new(UsageCounter::default_path());
    if reset {
        counter.reset()?;
        println!("counter reset");
        return Ok(());
    }
    match counter.peek()? {
        Some(n) => println!("{n}"),
        None => println!("0 (never used)"),
    }
    Ok(())
}
