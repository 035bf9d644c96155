//! Rule-based stand-ins for the model artifacts. Every function here is pure
//! and total: no artifact, no I/O, no error path.

pub mod churn;
pub mod credit;

pub use churn::{knn_churn_score, logreg_churn_probability, ChurnVerdict};
pub use credit::{CreditRatios, SegmentRule};
