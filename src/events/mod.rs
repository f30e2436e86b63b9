//! Conjunction event grouping and eligibility filtering
//!
//! A conjunction event is the set of all CDM rows sharing an `event_id`,
//! released in order of decreasing `time_to_tca`. The filter in this module
//! selects the events (and the single representative CDM per event) that are
//! eligible as supervised-learning examples.

mod filter;

pub use filter::{filter_events, EVENT_ID_COLUMN, MIN_CDMS_PER_EVENT, MIN_DAYS_TO_TCA, TIME_TO_TCA_COLUMN};
