//! Core types and trait definitions for the Plaint complaint desk.
//!
//! No HTTP or database code lives here. Storage backends and classifier
//! clients implement the traits defined here; the intake pipeline drives them.

// Trait methods spell out `+ Send` on their futures; impls use `async fn`.
#![allow(async_fn_in_trait)]

pub mod classify;
pub mod complaint;
pub mod error;
pub mod intake;
pub mod store;

pub use classify::ClassifyError;
pub use error::{Error, Result};
pub use intake::{Intake, IntakePipeline};
