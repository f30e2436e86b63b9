//! Data preprocessing
//!
//! Fit-once, transform-many preprocessing state shared between the training
//! and evaluation paths:
//! - Categorical encoding (label encoding to integer codes)
//! - Feature scaling (z-score normalization)
//!
//! Both components are fitted on training data and then reused read-only;
//! refitting on a different split would silently break the category-to-code
//! mapping and the scale parameters.

mod encoder;
mod scaler;

pub use encoder::LabelEncoder;
pub use scaler::StandardScaler;
