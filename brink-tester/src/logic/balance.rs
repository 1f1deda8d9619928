//! Balance sweeps: every strategy against every seed, aggregated per
//! scenario, mode and strategy.
use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::BTreeMap;

use brink_game::{Catalogs, Ending, GameMode};

use crate::logic::policy::GameplayStrategy;
use crate::logic::seeds::SeedInfo;
use crate::logic::simulation::{SimulationConfig, SimulationSession};

/// Minimum share of runs that must reach an ending.
const MIN_COMPLETION_RATE: f64 = 1.0;

#[derive(Debug, Clone, Serialize)]
pub struct BalanceRecord {
    pub scenario_id: String,
    pub mode: GameMode,
    pub strategy: GameplayStrategy,
    pub seed_code: String,
    pub seed: u64,
    pub ending: Option<Ending>,
    pub turns: u32,
    pub score: i32,
    pub strikes: u32,
    pub min_defcon: u8,
    pub allies: usize,
    pub commands_failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceAggregate {
    pub scenario_id: String,
    pub mode: GameMode,
    pub strategy: GameplayStrategy,
    pub runs: usize,
    pub completion_rate: f64,
    pub victory_rate: f64,
    pub mean_turns: f64,
    pub std_turns: f64,
    pub mean_score: f64,
    pub strike_rate: f64,
    pub mean_min_defcon: f64,
    pub endings: BTreeMap<String, usize>,
}

/// Play every `(scenario, mode, strategy, seed)` combination once per
/// iteration.
///
/// # Errors
///
/// Fails when a scenario id is unknown.
pub fn run_balance_sweep(
    catalogs: &Catalogs,
    scenario_ids: &[String],
    strategies: &[GameplayStrategy],
    seeds: &[SeedInfo],
    iterations: usize,
) -> Result<Vec<BalanceRecord>> {
    let mut records = Vec::new();
    for scenario_id in scenario_ids {
        for mode in [GameMode::Standard, GameMode::Brinkmanship] {
            for &strategy in strategies {
                for info in seeds.iter().filter(|info| info.matches_mode(mode)) {
                    for i in 0..iterations.max(1) {
                        let seed = info.seed.wrapping_add(u64::try_from(i).unwrap_or(0));
                        let config = SimulationConfig::new(scenario_id.clone(), mode, strategy, seed);
                        let session = SimulationSession::new(&config, catalogs.clone())?;
                        let mut policy = strategy.create_policy(seed);
                        let summary = session.run(policy.as_mut(), seed, mode);
                        log::debug!(
                            "{scenario_id} {} {strategy} seed {seed}: {}",
                            mode.key(),
                            summary.ending_label()
                        );
                        records.push(BalanceRecord {
                            scenario_id: scenario_id.clone(),
                            mode,
                            strategy,
                            seed_code: if i == 0 {
                                info.share_code_for_mode(mode)
                            } else {
                                summary.result.share_code.clone()
                            },
                            seed,
                            ending: summary.ending,
                            turns: summary.metrics.turns_played,
                            score: summary.result.score,
                            strikes: summary.final_state.strikes_launched,
                            min_defcon: summary.metrics.min_defcon,
                            allies: summary.metrics.allies,
                            commands_failed: summary.metrics.commands_failed,
                        });
                    }
                }
            }
        }
    }
    Ok(records)
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[allow(clippy::cast_precision_loss)]
fn rate(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

#[must_use]
pub fn aggregate_balance(records: &[BalanceRecord]) -> Vec<BalanceAggregate> {
    let mut groups: BTreeMap<(String, &'static str, GameplayStrategy), (GameMode, Vec<&BalanceRecord>)> =
        BTreeMap::new();
    for record in records {
        groups
            .entry((record.scenario_id.clone(), record.mode.key(), record.strategy))
            .or_insert_with(|| (record.mode, Vec::new()))
            .1
            .push(record);
    }

    groups
        .into_iter()
        .map(|((scenario_id, _, strategy), (mode, group))| {
            let runs = group.len();
            let turns: Vec<f64> = group.iter().map(|r| f64::from(r.turns)).collect();
            let scores: Vec<f64> = group.iter().map(|r| f64::from(r.score)).collect();
            let defcons: Vec<f64> = group.iter().map(|r| f64::from(r.min_defcon)).collect();
            let mut endings = BTreeMap::new();
            for record in &group {
                let key = record.ending.map_or("unfinished", Ending::key);
                *endings.entry(key.to_string()).or_insert(0) += 1;
            }
            BalanceAggregate {
                scenario_id,
                mode,
                strategy,
                runs,
                completion_rate: rate(group.iter().filter(|r| r.ending.is_some()).count(), runs),
                victory_rate: rate(
                    group
                        .iter()
                        .filter(|r| r.ending.is_some_and(Ending::is_victory))
                        .count(),
                    runs,
                ),
                mean_turns: mean(&turns),
                std_turns: std_dev(&turns),
                mean_score: mean(&scores),
                strike_rate: rate(group.iter().filter(|r| r.strikes > 0).count(), runs),
                mean_min_defcon: mean(&defcons),
                endings,
            }
        })
        .collect()
}

/// # Errors
///
/// Fails when any group has runs that never reached an ending.
pub fn validate_balance_targets(aggregates: &[BalanceAggregate]) -> Result<()> {
    let stalled: Vec<String> = aggregates
        .iter()
        .filter(|aggregate| aggregate.completion_rate < MIN_COMPLETION_RATE)
        .map(|aggregate| {
            format!(
                "{} {} {}: {:.0}% completed",
                aggregate.scenario_id,
                aggregate.mode.key(),
                aggregate.strategy,
                aggregate.completion_rate * 100.0
            )
        })
        .collect();
    if !stalled.is_empty() {
        bail!("campaigns failed to finish: {}", stalled.join("; "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(strategy: GameplayStrategy, ending: Option<Ending>, turns: u32) -> BalanceRecord {
        BalanceRecord {
            scenario_id: "cold_war_1962".to_string(),
            mode: GameMode::Standard,
            strategy,
            seed_code: "ST-SILO01".to_string(),
            seed: 1,
            ending,
            turns,
            score: 100,
            strikes: 0,
            min_defcon: 4,
            allies: 1,
            commands_failed: 0,
        }
    }

    #[test]
    fn aggregates_group_by_strategy() {
        let records = vec![
            record(GameplayStrategy::Hawk, Some(Ending::Survival), 60),
            record(GameplayStrategy::Hawk, Some(Ending::NuclearWinter), 20),
            record(GameplayStrategy::Diplomat, Some(Ending::Survival), 60),
        ];
        let aggregates = aggregate_balance(&records);
        assert_eq!(aggregates.len(), 2);
        let hawk = aggregates
            .iter()
            .find(|a| a.strategy == GameplayStrategy::Hawk)
            .unwrap();
        assert_eq!(hawk.runs, 2);
        assert!((hawk.mean_turns - 40.0).abs() < 1e-9);
        assert!((hawk.std_turns - 20.0).abs() < 1e-9);
        assert!((hawk.victory_rate - 0.5).abs() < 1e-9);
        assert_eq!(hawk.endings.get("nuclear_winter"), Some(&1));
        validate_balance_targets(&aggregates).unwrap();
    }

    #[test]
    fn unfinished_runs_fail_validation() {
        let aggregates = aggregate_balance(&[record(GameplayStrategy::Balanced, None, 61)]);
        assert_eq!(aggregates[0].endings.get("unfinished"), Some(&1));
        assert!(validate_balance_targets(&aggregates).is_err());
    }

    #[test]
    fn sweep_covers_both_modes() {
        let seeds = vec![SeedInfo::from_numeric(5)];
        let catalogs = Catalogs::default();
        let records = run_balance_sweep(
            &catalogs,
            &["cold_war_1962".to_string()],
            &[GameplayStrategy::Balanced],
            &seeds,
            1,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.ending.is_some()));
        let unknown = run_balance_sweep(
            &catalogs,
            &["atlantis".to_string()],
            &[GameplayStrategy::Hawk],
            &seeds,
            1,
        );
        assert!(unknown.is_err());
    }
}
