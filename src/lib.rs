//! Exploration of Brazilian football match datasets: per-team summaries, goal charts, a random
//! forest home-win classifier and a linear forecast of goals and wins, served as a web dashboard.

pub mod analysis;
pub mod chart;
pub mod config;
pub mod csv;
pub mod dataset;
pub mod file;
pub mod html;
pub mod predict;
pub mod print;
pub mod schema;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
