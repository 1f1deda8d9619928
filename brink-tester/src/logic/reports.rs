use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;
use super::balance::{BalanceAggregate, BalanceRecord};

#[allow(clippy::cast_precision_loss)]
fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    passed as f64 / results.len() as f64 * 100.0
}

/// # Errors
///
/// Propagates write failures.
pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
    aggregates: &[BalanceAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total scenarios: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {} (seed {})", status, result.scenario_name.bold(), result.seed)?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
        writeln!(out)?;
    }

    if !aggregates.is_empty() {
        writeln!(out, "{}", "⚖️  Balance Summary".bright_magenta().bold())?;
        writeln!(out, "{}", "==================".magenta())?;
        for aggregate in aggregates {
            writeln!(
                out,
                "{} [{}] {:<10} runs {:>3} | victory {:>5.1}% | turns {:>5.1} ± {:<4.1} | strikes {:>5.1}% | min DEFCON {:.1}",
                aggregate.scenario_id,
                aggregate.mode.key(),
                aggregate.strategy.label(),
                aggregate.runs,
                aggregate.victory_rate * 100.0,
                aggregate.mean_turns,
                aggregate.std_turns,
                aggregate.strike_rate * 100.0,
                aggregate.mean_min_defcon
            )?;
            let endings: Vec<String> = aggregate
                .endings
                .iter()
                .map(|(ending, count)| format!("{ending}={count}"))
                .collect();
            writeln!(out, "   endings: {}", endings.join(", "))?;
        }
    }
    Ok(())
}

/// # Errors
///
/// Fails when serialization or writing fails.
pub fn generate_json_report<W: Write + ?Sized>(out: &mut W, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

/// # Errors
///
/// Propagates write failures.
pub fn generate_markdown_report<W: Write + ?Sized>(out: &mut W, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Brinkmanship Logic Test Results\n")?;
    writeln!(out, "_Generated {}_\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {} (seed {})\n", status, result.scenario_name, result.seed)?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// # Errors
///
/// Propagates write failures.
pub fn generate_csv_report<W: Write + ?Sized>(out: &mut W, records: &[BalanceRecord]) -> Result<()> {
    writeln!(
        out,
        "scenario,mode,strategy,seed_code,seed,ending,turns,score,strikes,min_defcon,allies,commands_failed"
    )?;
    for record in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            record.scenario_id,
            record.mode.key(),
            record.strategy.label(),
            record.seed_code,
            record.seed,
            record.ending.map_or("unfinished", brink_game::Ending::key),
            record.turns,
            record.score,
            record.strikes,
            record.min_defcon,
            record.allies,
            record.commands_failed
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::GameplayStrategy;
    use brink_game::{Ending, GameMode};
    use std::collections::BTreeMap;

    fn result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Smoke".to_string(),
            seed: 1962,
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["forced failure".to_string()]
            },
            average_duration: Duration::from_millis(10),
            performance_data: vec![Duration::from_millis(10)],
        }
    }

    fn record() -> BalanceRecord {
        BalanceRecord {
            scenario_id: "cold_war_1962".to_string(),
            mode: GameMode::Brinkmanship,
            strategy: GameplayStrategy::Hawk,
            seed_code: "BR-SILO07".to_string(),
            seed: 7,
            ending: Some(Ending::NuclearWinter),
            turns: 22,
            score: 40,
            strikes: 3,
            min_defcon: 1,
            allies: 0,
            commands_failed: 4,
        }
    }

    fn aggregate() -> BalanceAggregate {
        BalanceAggregate {
            scenario_id: "cold_war_1962".to_string(),
            mode: GameMode::Standard,
            strategy: GameplayStrategy::Balanced,
            runs: 4,
            completion_rate: 1.0,
            victory_rate: 0.75,
            mean_turns: 50.0,
            std_turns: 5.0,
            mean_score: 300.0,
            strike_rate: 0.25,
            mean_min_defcon: 3.5,
            endings: BTreeMap::from([("survival".to_string(), 3), ("collapse".to_string(), 1)]),
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn console_report_lists_failures_and_balance() {
        let text = render(|out| {
            generate_console_report(out, &[result(true), result(false)], &[aggregate()], Duration::from_secs(1))
        });
        assert!(text.contains("Logic Test Results Summary"));
        assert!(text.contains("Success rate: 50.0%"));
        assert!(text.contains("forced failure"));
        assert!(text.contains("Balance Summary"));
        assert!(text.contains("collapse=1, survival=3"));
    }

    #[test]
    fn markdown_report_has_headings() {
        let text = render(|out| generate_markdown_report(out, &[result(true)]));
        assert!(text.starts_with("# Brinkmanship Logic Test Results"));
        assert!(text.contains("### ✅ Smoke (seed 1962)"));
    }

    #[test]
    fn json_report_round_trips() {
        let text = render(|out| generate_json_report(out, &[result(false)]));
        let parsed: Vec<ScenarioResult> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(!parsed[0].passed);
    }

    #[test]
    fn csv_report_has_header_and_rows() {
        let text = render(|out| generate_csv_report(out, &[record()]));
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("scenario,mode,strategy"));
        assert_eq!(
            lines.next().unwrap(),
            "cold_war_1962,brinkmanship,Hawk,BR-SILO07,7,nuclear_winter,22,40,3,1,0,4"
        );
    }
}
