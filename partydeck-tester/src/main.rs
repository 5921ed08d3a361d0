mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use partydeck_game::{GameMode, SessionConfig};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::{parse_seeds, resolve_modes, split_csv};
use logic::{ScenarioResult, SessionTester, SimulationPlan};

#[derive(Debug, Parser)]
#[command(name = "partydeck-tester", version = "0.1.0")]
#[command(about = "Seeded session simulator and invariant checker for the PartyDeck engine")]
struct Args {
    /// Game modes to simulate (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    modes: String,

    /// List all available game modes and exit
    #[arg(long)]
    list_modes: bool,

    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of sessions played per mode and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Player names seated at the start of each session (comma-separated)
    #[arg(long, default_value = "Ana,Bo,Cy,Dee")]
    players: String,

    /// Override the win threshold of every mode
    #[arg(long)]
    threshold: Option<u64>,

    /// Turn on which one player leaves (0 disables)
    #[arg(long, default_value_t = 3)]
    removal_turn: u32,

    /// Give up on a session after this many turns
    #[arg(long, default_value_t = 500)]
    max_turns: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_modes(&args)? {
        return Ok(());
    }

    if args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let modes = resolve_modes(&split_csv(&args.modes))?;
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    let players = split_csv(&args.players);

    let results = run_simulations(&args, &modes, &seeds, &players).await;
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_modes(args: &Args) -> Result<bool> {
    if !args.list_modes {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available modes:")?;
    for mode in GameMode::ALL {
        let config = SessionConfig::for_mode(mode);
        writeln!(
            output_target.writer(),
            "  {:20} - {}..={} units per turn, first to {}",
            mode.label(),
            config.units_per_round.min,
            config.units_per_round.max,
            config.win_threshold
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎲 PartyDeck Session Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

fn build_plan(args: &Args, mode: GameMode, players: &[String]) -> SimulationPlan {
    let removal_turn = (args.removal_turn > 0).then_some(args.removal_turn);
    SimulationPlan::new(mode, players.to_vec())
        .with_win_threshold(args.threshold)
        .with_max_turns(args.max_turns)
        .with_removal_turn(removal_turn)
}

async fn run_simulations(
    args: &Args,
    modes: &[GameMode],
    seeds: &[u64],
    players: &[String],
) -> Vec<ScenarioResult> {
    if args.report == "console" {
        println!("{}", "🧠 Running Session Simulations".bright_yellow().bold());
        println!("{}", "-".repeat(30).yellow());
    }

    let tester = SessionTester::new(args.verbose);
    let mut results = Vec::new();
    for &mode in modes {
        let plan = build_plan(args, mode, players);
        results.extend(tester.run_mode(&plan, seeds, args.iterations).await);
    }
    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    if args.report.as_str() == "json" {
        logic::reports::generate_json_report(&mut output_target, results)?;
    } else {
        let duration = start_time.elapsed();
        if results.is_empty() {
            writeln!(&mut output_target, "No sessions simulated.")?;
        } else {
            logic::reports::generate_console_report(&mut output_target, results, duration)?;
        }
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            modes: "all".to_string(),
            list_modes: false,
            seeds: "1337".to_string(),
            iterations: 1,
            players: "Ana,Bo,Cy,Dee".to_string(),
            threshold: None,
            removal_turn: 3,
            max_turns: 500,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "partydeck-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn args_parse_defaults() {
        let args = Args::parse_from(["partydeck-tester"]);
        assert_eq!(args.modes, "all");
        assert_eq!(args.seeds, "1337");
        assert_eq!(args.iterations, 10);
        assert_eq!(args.report, "console");
        assert!(args.threshold.is_none());
    }

    #[test]
    fn zero_removal_turn_disables_removal() {
        let mut args = base_args();
        args.removal_turn = 0;
        let plan = build_plan(&args, GameMode::Wheel, &["A".to_string()]);
        assert!(plan.removal_turn.is_none());

        args.threshold = Some(12);
        let plan = build_plan(&args, GameMode::Wheel, &["A".to_string()]);
        assert_eq!(plan.win_threshold, Some(12));
    }

    #[test]
    fn list_modes_writes_every_mode() {
        let mut args = base_args();
        args.list_modes = true;
        let path = temp_path("list");
        args.output = Some(path.clone());
        assert!(maybe_list_modes(&args).unwrap());
        let content = std::fs::read_to_string(path).unwrap();
        for mode in GameMode::ALL {
            assert!(content.contains(mode.label()));
        }
    }

    #[test]
    fn output_target_writes_to_file() {
        let path = temp_path("target");
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        writeln!(target, "hello").unwrap();
        target.flush_inner().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }

    #[tokio::test]
    async fn simulations_cover_each_mode_and_seed() {
        let mut args = base_args();
        args.seeds = "1,2".to_string();
        let modes = resolve_modes(&split_csv(&args.modes)).unwrap();
        let seeds = parse_seeds(&split_csv(&args.seeds)).unwrap();
        let players = split_csv(&args.players);
        let results = run_simulations(&args, &modes, &seeds, &players).await;
        assert_eq!(results.len(), GameMode::ALL.len() * 2);
        assert!(results.iter().all(|r| r.passed), "{results:#?}");
    }

    #[test]
    fn json_report_lands_in_output_file() {
        let mut args = base_args();
        let path = temp_path("json");
        args.output = Some(path.clone());
        write_reports(&args, &[], Instant::now()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["total"], 0);
    }
}
