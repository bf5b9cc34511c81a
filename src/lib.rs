//! Analytics query widget: asks a remote query/analysis service a natural-language
//! question and renders the tabular result, a chart derived from it and the
//! generated narrative, one query at a time.

pub mod client;
pub mod config;
pub mod util;
pub mod web;
pub mod widget;
