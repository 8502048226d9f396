//! Batch validation of independent definitions.
//!
//! Items run sequentially (`concurrency = 1`) or on up to `concurrency`
//! blocking tasks at once. Whatever the concurrency, each item gets its own
//! [`EvaluationContext`], every item of a batch sees the same catalog
//! snapshot, and results are stored by input index, so the report is the
//! same for every concurrency level.
//!
//! A timeout or an external shutdown future stops the batch: finished items
//! keep their results, unfinished ones are reported without a result and
//! the report is flagged `partial`.

mod progress;
mod report;


pub use progress::{ItemState, ProgressBoard};
pub use report::{BatchItemReport, BatchReport, ContractViolation};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use definitie_core::{DefinitionItem, EngineConfig, InputError};

use crate::catalog::Catalog;
use crate::context::{EvaluationContext, ValidateOptions};
use crate::result::ValidationResult;
use crate::validator::{assemble_result, evaluate_rules, DefinitionValidator};

/// How a batch is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum items evaluated at once; values below 1 are treated as 1.
    pub concurrency: usize,
    /// Abort pending items after this long.
    pub timeout: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            timeout: None,
        }
    }
}

impl BatchOptions {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn concurrent(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            concurrency: config.batch_concurrency,
            timeout: config.batch_timeout(),
        }
    }
}

/// What one item task hands back to the driver.
enum ItemOutcome {
    Validated(ValidationResult),
    Rejected(InputError),
}

/// Validate `items` and return their outcomes in input order.
pub async fn validate_batch(
    validator: &DefinitionValidator,
    items: Vec<DefinitionItem>,
    options: &BatchOptions,
) -> Result<BatchReport, ContractViolation> {
    validate_batch_until(validator, items, options, std::future::pending()).await
}

/// Like [`validate_batch`], but stops early when `shutdown` completes.
pub async fn validate_batch_until<F>(
    validator: &DefinitionValidator,
    items: Vec<DefinitionItem>,
    options: &BatchOptions,
    shutdown: F,
) -> Result<BatchReport, ContractViolation>
where
    F: Future<Output = ()>,
{
    let catalog = validator.catalog();
    let total = items.len();
    let concurrency = options.concurrency.max(1);

    info!(
        items = total,
        concurrency,
        generation = catalog.generation(),
        "batch started"
    );
    if concurrency > 1 {
        info!(concurrency, "parallel execution active");
    }

    let board = Arc::new(ProgressBoard::new(total));
    let permits = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let catalog = Arc::clone(&catalog);
        let board = Arc::clone(&board);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return (index, None);
            };
            let outcome =
                tokio::task::spawn_blocking(move || run_item(&catalog, &board, index, item)).await;
            (index, Some(outcome))
        });
    }

    let mut slots: Vec<Option<ItemOutcome>> = (0..total).map(|_| None).collect();
    let deadline = async {
        match options.timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending().await,
        }
    };

    let partial = tokio::select! {
        drained = drain(&mut tasks, &mut slots, &board) => {
            drained?;
            false
        }
        _ = deadline => {
            warn!(timeout = ?options.timeout, "batch timed out, abandoning unfinished items");
            true
        }
        _ = shutdown => {
            warn!("batch shutdown requested, abandoning unfinished items");
            true
        }
    };
    if partial {
        let late = collect_finished(&mut tasks, &mut slots, &board)?;
        if late > 0 {
            debug!(late, "kept results that finished as the batch stopped");
        }
    }
    tasks.abort_all();

    let states = board.snapshot();
    let report = BatchReport {
        items: slots
            .into_iter()
            .zip(states)
            .enumerate()
            .map(|(index, (slot, state))| {
                let (result, input_error) = match slot {
                    Some(ItemOutcome::Validated(r)) => (Some(r), None),
                    Some(ItemOutcome::Rejected(e)) => (None, Some(e)),
                    None => (None, None),
                };
                BatchItemReport {
                    index,
                    state,
                    result,
                    input_error,
                }
            })
            .collect(),
        partial,
        catalog_generation: catalog.generation(),
    };

    info!(
        items = total,
        completed = report.completed(),
        errored = report.errored(),
        abandoned = report.abandoned(),
        partial,
        "batch finished"
    );
    Ok(report)
}

type ItemTaskOutput = (
    usize,
    Option<Result<Result<ItemOutcome, ContractViolation>, tokio::task::JoinError>>,
);

/// Collect finished items into their slots until every task has joined.
async fn drain(
    tasks: &mut JoinSet<ItemTaskOutput>,
    slots: &mut [Option<ItemOutcome>],
    board: &ProgressBoard,
) -> Result<(), ContractViolation> {
    while let Some(joined) = tasks.join_next().await {
        store(joined, slots, board)?;
    }
    Ok(())
}

/// Collect items whose tasks already finished, without waiting for the rest.
fn collect_finished(
    tasks: &mut JoinSet<ItemTaskOutput>,
    slots: &mut [Option<ItemOutcome>],
    board: &ProgressBoard,
) -> Result<usize, ContractViolation> {
    let mut collected = 0;
    while let Some(joined) = tasks.try_join_next() {
        store(joined, slots, board)?;
        collected += 1;
    }
    Ok(collected)
}

fn store(
    joined: Result<ItemTaskOutput, tokio::task::JoinError>,
    slots: &mut [Option<ItemOutcome>],
    board: &ProgressBoard,
) -> Result<(), ContractViolation> {
    let (index, outcome) = match joined {
        Ok((index, Some(Ok(outcome)))) => (index, outcome?),
        Ok((index, Some(Err(e)))) => {
            error!(index, error = %e, "batch item task failed");
            return Ok(());
        }
        Ok((index, None)) => {
            error!(index, "batch item could not acquire a permit");
            return Ok(());
        }
        Err(e) if e.is_cancelled() => return Ok(()),
        Err(e) => {
            error!(error = %e, "batch item task failed");
            return Ok(());
        }
    };

    let slot = slots
        .get_mut(index)
        .ok_or(ContractViolation::UnknownSlot { index })?;
    if slot.is_some() {
        error!(index, "result slot filled twice");
        return Err(ContractViolation::SlotFilledTwice { index });
    }
    if matches!(outcome, ItemOutcome::Validated(_)) {
        board.advance(index, ItemState::Done)?;
    }
    *slot = Some(outcome);
    Ok(())
}

/// Evaluate one item on its own context.
fn run_item(
    catalog: &Catalog,
    board: &ProgressBoard,
    index: usize,
    item: DefinitionItem,
) -> Result<ItemOutcome, ContractViolation> {
    let options = ValidateOptions::from(&item);
    let ctx = match EvaluationContext::build(&item.term, &item.text, &options) {
        Ok(ctx) => ctx,
        Err(e) => {
            board.advance(index, ItemState::Errored)?;
            debug!(index, error = %e, "batch item rejected");
            return Ok(ItemOutcome::Rejected(e));
        }
    };
    board.advance(index, ItemState::ContextBuilt)?;

    board.advance(index, ItemState::RulesEvaluating)?;
    let rule_results = evaluate_rules(catalog, &ctx);

    let result = assemble_result(catalog, &ctx, rule_results);
    board.advance(index, ItemState::Aggregated)?;

    debug!(
        index,
        correlation_id = %ctx.correlation_id(),
        score = result.overall_score,
        "batch item evaluated"
    );
    Ok(ItemOutcome::Validated(result))
}
