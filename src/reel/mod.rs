pub mod calendar;
pub mod civil;
pub mod config;
pub mod consolidate;
pub mod dedupe;
pub mod enrich;
pub mod fetch;
pub mod merge;
pub mod overrides;
pub mod paths;
pub mod record;
pub mod snapshot;
pub mod warn;
