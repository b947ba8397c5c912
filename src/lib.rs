// src/lib.rs
//
// Resilient extraction of probate case records from the Franklin County
// probate search site, cross-referenced against the county auditor's
// property search, projected into one flat CSV row per case.

pub mod driver;
pub mod extract;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod retry;
