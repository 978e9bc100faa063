//! Assetflow - stylesheet and script asset pipelines
//!
//! This library provides:
//! - A style pipeline: Sass compile, vendor prefixing, minification, bundling
//! - A script pipeline: ordered bundling and minification
//! - Watch mode that reruns a pipeline when its sources change

pub mod asset;
pub mod cli;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod stages;
pub mod watch;
