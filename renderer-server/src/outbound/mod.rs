pub mod metrics;
pub mod notifiers;
pub mod repositories;
