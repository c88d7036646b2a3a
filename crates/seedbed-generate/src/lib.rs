//! Rule-driven row generation and population for seedbed.
//!
//! Tables discovered by an adapter get a default generator per column,
//! configured rules override those generators, and the population engine
//! inserts rows in foreign-key order through a [`store::RowStore`].

pub mod engine;
pub mod errors;
pub mod foreign;
pub mod generators;
pub mod model;
pub mod output;
pub mod planner;
pub mod rng;
pub mod rules;
pub mod store;

pub use engine::PopulationEngine;
pub use errors::{GenerationError, StoreError};
pub use generators::{GeneratorFn, GeneratorRegistry};
pub use model::{
    Column, PopulateOptions, PopulationReport, Table, TableReport, TableStatus,
};
pub use planner::{apply_rules, plan_tables};
pub use rng::RandomSource;
pub use rules::compile_rule;
pub use store::{ColumnBinding, InMemoryStore, RowStore};
