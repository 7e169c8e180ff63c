pub mod analytics;
pub mod error;
pub mod handlers;
pub mod models;

#[cfg(test)]
mod tests;
