//! Append-only survey storage on sled.
//!
//! Three trees back the core:
//! - `contexts` — calibration epochs, keyed `well_id \0 active_from \0 seq`
//!   so the active (most recent) context is the last key under a well prefix.
//! - `inputs` — ingested stations keyed by input id.
//! - `solutions` — computed solutions keyed `well_id \0 md \0 seq` with an
//!   order-preserving f64 encoding, so depth-ordered listing and
//!   previous-by-depth lookup are plain range scans.
//!
//! Nothing is ever deleted in normal operation — updating a well's context
//! means inserting a new row, and solutions form an immutable ledger.

use std::path::Path;
use uuid::Uuid;

use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;

use crate::error::SurveyError;
use crate::types::{SurveyContext, SurveyInput, SurveySolution};

/// Handle to the survey database. Cheap to clone; all clones share the
/// underlying sled trees.
#[derive(Clone)]
pub struct SurveyStore {
    db: sled::Db,
    contexts: sled::Tree,
    inputs: sled::Tree,
    solutions: sled::Tree,
}

// ============================================================================
// Key encoding
// ============================================================================

/// Encode an f64 so that byte-wise ordering matches numeric ordering.
///
/// Flips all bits for negatives and the sign bit for non-negatives — the
/// standard order-preserving IEEE-754 trick.
fn md_order_key(md_m: f64) -> [u8; 8] {
    let bits = md_m.to_bits();
    let ordered = if bits >> 63 == 1 {
        !bits
    } else {
        bits ^ (1 << 63)
    };
    ordered.to_be_bytes()
}

/// `well_id \0` — prefix under which all of a well's rows in a tree sort.
fn well_prefix(well_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(well_id.len() + 1);
    key.extend_from_slice(well_id.as_bytes());
    key.push(0);
    key
}

fn context_key(well_id: &str, active_from_nanos: i64, seq: u64) -> Vec<u8> {
    let mut key = well_prefix(well_id);
    // Sign-flip keeps pre-epoch timestamps sorting before post-epoch ones.
    key.extend_from_slice(&(active_from_nanos as u64 ^ (1 << 63)).to_be_bytes());
    key.push(0);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

fn solution_key(well_id: &str, md_m: f64, seq: u64) -> Vec<u8> {
    let mut key = well_prefix(well_id);
    key.extend_from_slice(&md_order_key(md_m));
    key.push(0);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

// ============================================================================
// Store operations
// ============================================================================

impl SurveyStore {
    /// Open or create the survey database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SurveyError> {
        let db = sled::open(path.as_ref())?;
        let contexts = db.open_tree("contexts")?;
        let inputs = db.open_tree("inputs")?;
        let solutions = db.open_tree("solutions")?;

        tracing::info!(path = %path.as_ref().display(), "Survey storage opened");

        Ok(Self {
            db,
            contexts,
            inputs,
            solutions,
        })
    }

    /// Insert a new context row. Always appends — contexts are immutable and
    /// versioned by `active_from`.
    pub fn put_context(&self, ctx: &SurveyContext) -> Result<Uuid, SurveyError> {
        let nanos = ctx
            .active_from
            .timestamp_nanos_opt()
            .unwrap_or_else(|| ctx.active_from.timestamp() * 1_000_000_000);
        let seq = self.db.generate_id()?;
        let key = context_key(&ctx.well_id, nanos, seq);
        let value = serde_json::to_vec(ctx)?;

        self.contexts.insert(key, value)?;
        self.db.flush()?;

        tracing::debug!(well = %ctx.well_id, context = %ctx.id, "Stored survey context");
        Ok(ctx.id)
    }

    /// The context with the greatest `active_from` for the well, or `None`.
    pub fn active_context(&self, well_id: &str) -> Result<Option<SurveyContext>, SurveyError> {
        match self.contexts.scan_prefix(well_prefix(well_id)).next_back() {
            Some(item) => {
                let (_key, value) = item?;
                Ok(Some(serde_json::from_slice(&value)?))
            }
            None => Ok(None),
        }
    }

    /// Persist an input and its solution as a single logical unit.
    pub fn put_survey(
        &self,
        input: &SurveyInput,
        solution: &SurveySolution,
    ) -> Result<(), SurveyError> {
        let input_bytes = serde_json::to_vec(input)?;
        let solution_bytes = serde_json::to_vec(solution)?;
        let seq = self.db.generate_id()?;
        let sol_key = solution_key(&input.well_id, solution.md_m, seq);

        (&self.inputs, &self.solutions)
            .transaction(|(inputs, solutions)| {
                inputs.insert(input.id.as_bytes().as_slice(), input_bytes.as_slice())?;
                solutions.insert(sol_key.as_slice(), solution_bytes.as_slice())?;
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e| match e {
                TransactionError::Storage(err) => SurveyError::Storage(err),
                // Unreachable: the closure never aborts.
                TransactionError::Abort(()) => {
                    SurveyError::Storage(sled::Error::Unsupported("survey write aborted".into()))
                }
            })?;
        self.db.flush()?;

        tracing::debug!(
            well = %input.well_id,
            input = %input.id,
            solution = %solution.id,
            md_m = input.md_m,
            "Stored survey input + solution"
        );
        Ok(())
    }

    /// The solution with the greatest measured depth strictly below `md_m`
    /// for this well. Depth order, not insertion order.
    pub fn previous_solution(
        &self,
        well_id: &str,
        md_m: f64,
    ) -> Result<Option<SurveySolution>, SurveyError> {
        let start = well_prefix(well_id);
        let mut end = start.clone();
        end.extend_from_slice(&md_order_key(md_m));

        // `end` is exclusive, so rows at exactly `md_m` are not candidates.
        match self.solutions.range(start..end).next_back() {
            Some(item) => {
                let (_key, value) = item?;
                Ok(Some(serde_json::from_slice(&value)?))
            }
            None => Ok(None),
        }
    }

    /// All solutions for a well, ascending by measured depth. Rows at equal
    /// depth come back in insertion order.
    pub fn solutions(&self, well_id: &str) -> Result<Vec<SurveySolution>, SurveyError> {
        let mut out = Vec::new();
        for item in self.solutions.scan_prefix(well_prefix(well_id)) {
            let (_key, value) = item?;
            out.push(serde_json::from_slice(&value)?);
        }
        Ok(out)
    }

    /// Look up an input by id.
    pub fn input(&self, id: Uuid) -> Result<Option<SurveyInput>, SurveyError> {
        match self.inputs.get(id.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }
}
