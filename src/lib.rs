// Library for tests to access modules

pub mod canonical;
pub mod config;
pub mod error;
pub mod fleet;
pub mod gap;
pub mod layout;
pub mod models;
pub mod report;
pub mod serializer;
pub mod steps;
pub mod version;
pub mod worker;
