//! Rule Tables
//!
//! Static reference data driving every structural check, loaded from TOML.

pub mod schema;
pub mod tables;

pub use schema::RuleFile;
pub use tables::{
    join_names, Category, ElementName, RequiredAttribute, RuleTableError, RuleTables,
    BUILTIN_RULES_TOML,
};
