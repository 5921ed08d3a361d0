use colored::Colorize;
use partydeck_game::GameMode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::simulation::{SimulationPlan, SimulationSummary, run_plan};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub mode: GameMode,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct SessionTester {
    verbose: bool,
}

impl SessionTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub async fn run_mode(
        &self,
        plan: &SimulationPlan,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing mode: {} (seed: {})",
                    plan.mode.label().bright_white(),
                    seed
                );
            }
            results.push(self.run_single(plan, seed, iterations).await);
        }

        results
    }

    async fn run_single(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let verdict = match run_plan(plan, iteration_seed).await {
                Ok(summary) => check_invariants(&summary).map(|()| summary),
                Err(err) => Err(format!("{err:#}")),
            };

            match verdict {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) turns:{} winner:{}",
                            i + 1,
                            iterations,
                            summary.turns.len(),
                            summary
                                .winner
                                .map_or_else(|| "-".to_string(), |w| w.to_string())
                        );
                    }
                }
                Err(err) => {
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            err.clone().red()
                        );
                    }
                    failures.push(format!(
                        "Iteration {} (mode {}, seed {}): {}",
                        i + 1,
                        plan.mode,
                        iteration_seed,
                        err
                    ));
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: format!("{} (seed {seed})", plan.mode.label()),
            mode: plan.mode,
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }
}

/// Checks a finished session against the scoring and win rules.
///
/// # Errors
///
/// Returns a description of the first rule the session broke.
pub fn check_invariants(summary: &SimulationSummary) -> Result<(), String> {
    let expected = summary.awarded.saturating_sub(summary.discarded());
    if summary.total_points() != expected {
        return Err(format!(
            "points not conserved: roster holds {} but {} awarded and {} discarded",
            summary.total_points(),
            summary.awarded,
            summary.discarded()
        ));
    }

    if summary.completions != 1 {
        return Err(format!(
            "expected exactly one completion, saw {} after {} turns",
            summary.completions,
            summary.turns.len()
        ));
    }

    let Some(winner) = summary.winner else {
        return Err("session completed without a winner".to_string());
    };
    match summary.winner_points() {
        Some(points) if points >= summary.threshold => {}
        Some(points) => {
            return Err(format!(
                "winner {winner} has {points} points, below threshold {}",
                summary.threshold
            ));
        }
        None => return Err(format!("winner {winner} is not on the roster")),
    }

    let first_qualifier = summary
        .final_players
        .iter()
        .find(|p| p.points >= summary.threshold)
        .map(|p| p.id);
    if first_qualifier != Some(winner) {
        return Err(format!(
            "winner {winner} is not the first qualifying player in roster order"
        ));
    }

    if summary.final_players != summary.stored_players {
        return Err("stored roster diverged from the session roster".to_string());
    }

    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
