pub mod agents;
pub mod cli;
pub mod config;
pub mod ingress;
pub mod ledger;
pub mod logging;
pub mod orchestrator;
pub mod policy;
pub mod types;
pub mod window;
