pub mod alerts;
pub mod charts;
pub mod evaluator;
pub mod market;
pub mod notifier;
pub mod portfolio;
pub mod prefs;
pub mod rates;

#[cfg(test)]
pub mod testkit;
