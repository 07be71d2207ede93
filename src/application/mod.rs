pub mod calendar_generator;
pub mod commands;
