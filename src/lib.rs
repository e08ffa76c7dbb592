//! Terminal random name picker: a spinning wheel paired with a question
//! wheel, plus dice and treasure chest pick modes.

pub mod app;
pub mod events;
pub mod integrations;
pub mod ui;
pub mod utils;
pub mod wheel;
