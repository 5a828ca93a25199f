//! Multi-run training, sequential or parallel (spec §4.11).
//!
//! Run-level parallelism is grounded on the teacher's
//! `population::PopulationBuilder::build_population`/`ga::par_breed_offspring`
//! rayon fan-out idiom (`rayon::join`/`par_iter` plus a forked `Prng` per
//! branch), applied here at the run level rather than the
//! individual/offspring level. The optional progress broadcast is grounded
//! on `tokio::sync::watch`, the closest std-adjacent single-producer/
//! multi-consumer *latest-value* channel to the coroutine-plus-broadcast
//! pattern described in spec §9 "Async training" — `xsa-dev-hyperliquid-
//! backtest::real_time_monitoring` reaches for `tokio::sync::broadcast` for
//! its own live-update fan-out, confirming `tokio::sync` as this corpus's
//! go-to for exactly this shape of channel.

use rayon::prelude::*;
use tokio::sync::watch;
use tracing::info;

use crate::dataset::Dataset;
use crate::error::Error;
use crate::evolution::EvolutionResult;
use crate::generators::ProgramGenerator;
use crate::random::{Prng, Seed};

/// A `(progress_fraction, latest_result)` update broadcast by
/// [`Trainer::train_with_progress`] as each run completes (spec §4.11 last
/// paragraph).
#[derive(Clone, Debug)]
pub struct ProgressUpdate {
    pub progress_fraction: f64,
    pub latest_result: EvolutionResult,
}

/// Runs `number_of_runs` independent evolution models and aggregates their
/// results (spec §4.11). A conforming caller supplies a closure that builds
/// one fully-configured run (its own [`crate::evolution::EvolutionModel`])
/// given that run's own seeded [`Prng`], since the model type itself is
/// generic over its program generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trainer {
    number_of_runs: usize,
}

impl Trainer {
    pub fn new(number_of_runs: usize) -> Self {
        Trainer { number_of_runs }
    }

    pub fn number_of_runs(&self) -> usize {
        self.number_of_runs
    }

    /// Runs each configured run in order, feeding the *same* `rng` stream
    /// forward from run to run (spec §4.11 "Sequential": "RNG progression
    /// continues across runs unless explicitly re-seeded").
    pub fn train_sequential<G, F>(
        &self,
        rng: &mut Prng,
        dataset: &Dataset,
        mut run_once: F,
    ) -> Result<Vec<EvolutionResult>, Error>
    where
        G: ProgramGenerator + Sync,
        F: FnMut(&mut Prng, &Dataset) -> Result<EvolutionResult, Error>,
    {
        let mut results = Vec::with_capacity(self.number_of_runs);
        for run_index in 0..self.number_of_runs {
            info!(run_index, "starting sequential training run");
            results.push(run_once(rng, dataset)?);
        }
        Ok(results)
    }

    /// Runs each configured run concurrently on its own worker, each with an
    /// independently seeded `Prng` derived deterministically from `seed`
    /// (spec §4.11 "Distributed": "deterministic seed must yield identical
    /// results between sequential and distributed variants when per-run
    /// seeds are derived deterministically").
    #[cfg(not(target_arch = "wasm32"))]
    pub fn train_distributed<F>(
        &self,
        seed: Seed,
        dataset: &Dataset,
        run_once: F,
    ) -> Result<Vec<EvolutionResult>, Error>
    where
        F: Fn(&mut Prng, &Dataset) -> Result<EvolutionResult, Error> + Sync,
    {
        let mut seeder = Prng::from_seed(seed);
        let run_seeds: Vec<Prng> = (0..self.number_of_runs).map(|_| seeder.fork()).collect();

        info!(number_of_runs = self.number_of_runs, "starting distributed training");

        run_seeds
            .into_par_iter()
            .map(|mut run_rng| run_once(&mut run_rng, dataset))
            .collect()
    }

    /// Like [`Trainer::train_distributed`], but broadcasts a
    /// `(progress_fraction, latest_result)` update on `sender` as each run
    /// completes (spec §4.11 last paragraph). The channel carries
    /// latest-value semantics: a consumer that misses intermediate updates
    /// still observes the most recent one on the next `changed()`/`borrow()`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn train_with_progress<F>(
        &self,
        seed: Seed,
        dataset: &Dataset,
        run_once: F,
        sender: &watch::Sender<Option<ProgressUpdate>>,
    ) -> Result<Vec<EvolutionResult>, Error>
    where
        F: Fn(&mut Prng, &Dataset) -> Result<EvolutionResult, Error> + Sync,
    {
        let mut seeder = Prng::from_seed(seed);
        let run_seeds: Vec<Prng> = (0..self.number_of_runs).map(|_| seeder.fork()).collect();
        let total = self.number_of_runs as f64;
        let completed = std::sync::atomic::AtomicUsize::new(0);

        run_seeds
            .into_par_iter()
            .map(|mut run_rng| {
                let result = run_once(&mut run_rng, dataset)?;
                let finished = completed.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
                let _ = sender.send(Some(ProgressUpdate {
                    progress_fraction: finished as f64 / total,
                    latest_result: result.clone(),
                }));
                Ok(result)
            })
            .collect()
    }
}

/// Constructs a `(sender, receiver)` pair for [`Trainer::train_with_progress`].
pub fn progress_channel() -> (watch::Sender<Option<ProgressUpdate>>, watch::Receiver<Option<ProgressUpdate>>) {
    watch::channel(None)
}
