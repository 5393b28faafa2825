//! Integration tests for section selection, generation runs, and rollback

mod config_layers;
mod generation_run;
mod history_rollback;
mod http_provider;
mod selection_scope;
mod test_utils;
