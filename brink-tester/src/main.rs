mod logic;
mod util;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use brink_game::Catalogs;
use logic::{
    BalanceAggregate, BalanceRecord, GameplayStrategy, LogicTester, ScenarioResult, SeedInfo,
    aggregate_balance, all_keys, get_scenario, list_scenarios, resolve_seed_inputs,
    run_balance_sweep, validate_balance_targets,
};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "brink-tester", version = "0.1.0")]
#[command(about = "Automated campaign testing and balance sweeps for Brinkmanship")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated numbers, `a..b` ranges, share codes, or `all`)
    #[arg(long, default_value = "1962")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Autopilot strategies used by the balance sweep (comma-separated)
    #[arg(long, default_value = "diplomat,hawk,balanced,technocrat,chaotic")]
    strategies: String,

    /// Run a balance sweep over every bundled scenario
    #[arg(long)]
    balance: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let catalogs = Catalogs::default();
    let scenarios = expand_scenarios(&args.scenarios);
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let logic_seeds: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();

    let results = run_logic_scenarios(&args, &scenarios, &logic_seeds, &catalogs);
    let (records, aggregates) = gather_balance(&args, &catalogs, &seed_infos)?;

    write_reports(&args, &results, &records, &aggregates, start_time)?;

    if !aggregates.is_empty() {
        validate_balance_targets(&aggregates)?;
    }

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 Brinkmanship Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for key in all_keys() {
            if !scenarios.contains(&key) {
                scenarios.push(key);
            }
        }
    }
    scenarios
}

fn parse_strategies(arg: &str) -> Result<Vec<GameplayStrategy>> {
    split_csv(arg)
        .iter()
        .map(|token| {
            GameplayStrategy::from_key(token)
                .with_context(|| format!("unknown strategy: {token}"))
        })
        .collect()
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    logic_seeds: &[u64],
    catalogs: &Catalogs,
) -> Vec<ScenarioResult> {
    let mut results = Vec::new();
    if scenarios.is_empty() {
        return results;
    }

    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(catalogs.clone(), args.verbose);
    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(tester.run_scenario(&scenario, logic_seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

fn gather_balance(
    args: &Args,
    catalogs: &Catalogs,
    seed_infos: &[SeedInfo],
) -> Result<(Vec<BalanceRecord>, Vec<BalanceAggregate>)> {
    if !args.balance {
        return Ok((Vec::new(), Vec::new()));
    }
    let strategies = parse_strategies(&args.strategies)?;
    if strategies.is_empty() {
        bail!("balance sweep needs at least one strategy");
    }
    println!("{}", "⚖️  Running Balance Sweep".bright_magenta().bold());
    println!("{}", "-".repeat(30).magenta());

    let scenario_ids: Vec<String> = catalogs.scenarios.ids().map(str::to_string).collect();
    let records = run_balance_sweep(catalogs, &scenario_ids, &strategies, seed_infos, args.iterations)?;
    let aggregates = aggregate_balance(&records);
    Ok((records, aggregates))
}

fn write_reports(
    args: &Args,
    results: &[ScenarioResult],
    records: &[BalanceRecord],
    aggregates: &[BalanceAggregate],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Brinkmanship Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, records)?,
        _ => {
            if results.is_empty() && aggregates.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    aggregates,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
