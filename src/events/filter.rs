//! Event eligibility filter

use crate::error::{KesslerError, Result};
use polars::prelude::*;
use std::collections::HashMap;

/// Column holding the event identifier shared by all CDMs of one event.
pub const EVENT_ID_COLUMN: &str = "event_id";

/// Column holding the time to closest approach, in days.
pub const TIME_TO_TCA_COLUMN: &str = "time_to_tca";

/// An event needs one CDM to infer from and one held out as target.
pub const MIN_CDMS_PER_EVENT: usize = 2;

/// The retained CDM must be released at least this many days before TCA
/// to be operationally useful for early warning.
pub const MIN_DAYS_TO_TCA: f64 = 2.0;

/// Per-event aggregates collected in a single pass over the rows.
struct EventGroup {
    cdm_count: usize,
    /// Minimum `time_to_tca` seen so far and the row that holds it
    /// (first occurrence wins on ties).
    min_tca: Option<(f64, usize)>,
}

/// Filter CDM rows down to the subset eligible for supervised learning.
///
/// Keeps, per event, only the most recent CDM (minimum `time_to_tca`), and
/// only when the event has at least [`MIN_CDMS_PER_EVENT`] CDMs and that
/// retained CDM was released at least [`MIN_DAYS_TO_TCA`] days before the
/// closest approach. An event whose final CDM already fell inside the
/// [`MIN_DAYS_TO_TCA`]-day window is eliminated entirely, even though it has
/// enough CDMs: such events were observed too late to be actionable
/// training examples.
///
/// The input is never mutated. Output rows keep their input order, so
/// repeated runs over the same frame yield identical results. An empty
/// frame passes through unchanged.
pub fn filter_events(df: &DataFrame) -> Result<DataFrame> {
    if df.height() == 0 {
        return Ok(df.clone());
    }

    // Event ids may be integers or strings in the raw CSV; normalize to
    // string keys so grouping does not depend on the inferred dtype.
    let ids = df
        .column(EVENT_ID_COLUMN)
        .map_err(|_| KesslerError::MissingColumn(EVENT_ID_COLUMN.to_string()))?
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| KesslerError::DataError(e.to_string()))?;
    let ids = ids
        .str()
        .map_err(|e| KesslerError::DataError(e.to_string()))?;

    let tca = df
        .column(TIME_TO_TCA_COLUMN)
        .map_err(|_| KesslerError::MissingColumn(TIME_TO_TCA_COLUMN.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| KesslerError::DataError(e.to_string()))?;
    let tca = tca
        .f64()
        .map_err(|e| KesslerError::DataError(e.to_string()))?;

    let mut groups: HashMap<&str, EventGroup> = HashMap::new();
    for row in 0..df.height() {
        let Some(id) = ids.get(row) else { continue };
        let group = groups.entry(id).or_insert(EventGroup {
            cdm_count: 0,
            min_tca: None,
        });
        group.cdm_count += 1;
        if let Some(t) = tca.get(row) {
            // Strict comparison keeps the first row on ties, so the
            // selection is reproducible across runs.
            if group.min_tca.map_or(true, |(min, _)| t < min) {
                group.min_tca = Some((t, row));
            }
        }
    }

    let mut keep = vec![false; df.height()];
    for group in groups.values() {
        if group.cdm_count < MIN_CDMS_PER_EVENT {
            continue;
        }
        if let Some((min, row)) = group.min_tca {
            if min >= MIN_DAYS_TO_TCA {
                keep[row] = true;
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    df.filter(&mask)
        .map_err(|e| KesslerError::DataError(e.to_string()))
}
