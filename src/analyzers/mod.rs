//! Row validation, classification and aggregation.
//!
//! [`validate`] filters parsed rows down to genuine inquiries and tags each
//! one with a category, [`aggregate`] reduces them into the ranked
//! breakdowns of an [`types::AggregateSummary`], and [`leads`] builds the
//! lead table.

pub mod aggregate;
pub mod classify;
pub mod insights;
pub mod leads;
pub mod types;
pub mod utility;
pub mod validate;
