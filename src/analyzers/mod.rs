//! Market interest scoring.
//!
//! Canonical records are grouped per (quarter, cohort, make, variant),
//! winsorized and robustly z-scored within each (quarter, cohort), combined
//! into a weighted composite, indexed and ranked per quarter, and finally
//! smoothed across quarters. The resulting table can be published locally
//! and to S3.

pub mod aggregate;
pub mod pipeline;
pub mod robust;
pub mod score;
pub mod sink;
pub mod temporal;
pub mod types;
pub mod utility;
