//! Host bridge for the Song of Heroic Lands computation core.
//!
//! The host owns documents and pushes world time; this crate turns host
//! documents into logic trees, drives their recompute cycle, persists
//! changes back and executes actions.
//!
//! Modules are organized by responsibility:
//! - [`store`] defines the async persistence contract the host implements
//! - [`session`] holds the registries and clock a session injects into the core
//! - [`data_model`] and [`actor`] adapt host documents and run the cycle
//! - [`persistence`] writes create/update/delete results back to the host
//! - [`dispatch`] executes intrinsic and script actions
//! - [`logging`] installs tracing subscribers
pub mod actor;
pub mod clock;
pub mod config;
pub mod data_model;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod session;
pub mod store;

pub use actor::{SohlActor, SohlItem};
pub use clock::SharedWorldClock;
pub use config::RuntimeConfig;
pub use data_model::SohlDataModel;
pub use dispatch::{
    ActionCall, ActionDispatcher, DispatchOutcome, IntrinsicFunction, ScriptHost, ScriptRequest,
};
pub use error::{HostError, Result, RuntimeError};
pub use logging::{init_file_tracing, init_tracing};
pub use persistence::{create_logic, delete_logic, flush, sweep_expired_effects, update_logic};
pub use session::Session;
pub use store::{DocumentStore, HostDocument, InMemoryDocumentStore, LOGIC_OBJ};
