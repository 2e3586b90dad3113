#![deny(unused_imports)]
#![deny(unused_variables)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod reference;
pub mod traits;
pub mod types;
