#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown,
    clippy::unused_async,
    clippy::return_self_not_must_use,
    clippy::explicit_iter_loop,
    clippy::default_trait_access,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

pub(crate) mod api;
pub mod app;
pub mod config;
pub mod dataset;
pub mod error;
pub mod normalize;
pub mod observability;
pub mod service;
pub mod taxonomy;
pub mod training;
