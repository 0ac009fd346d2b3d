pub mod cidr;
pub mod common;
pub mod errors;
pub mod export;
pub mod fetcher;
pub mod graph;
pub mod inventory;
pub mod orchestrator;
pub mod plan;
pub mod plan_execution;
pub mod relationships;
pub mod routes;
pub mod rules;
