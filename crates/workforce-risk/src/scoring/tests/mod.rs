mod common;

mod composite;
mod engine;
mod learning;
mod performance;
mod simulate;
mod training;
