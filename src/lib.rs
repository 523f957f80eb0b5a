//! Diagnostic plots for a participant selection: how the selected rows'
//! attribute distributions compare with the full pool, and how pairs of
//! attributes relate.
//!
//! The plotting functions in [`plotting`] turn a [`Table`] (plus
//! [`Mapper`]s) into backend-agnostic [`Chart`]s; the `cohort-view` binary
//! draws them with egui_plot.
//!
//! [`Table`]: data::model::Table
//! [`Mapper`]: mapper::Mapper
//! [`Chart`]: chart::Chart

pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod mapper;
pub mod plotting;

pub use error::PlotError;
