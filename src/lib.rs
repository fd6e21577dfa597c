pub mod app;
pub mod browser;
pub mod catalogue;
pub mod cli;
pub mod config;
pub mod filter;
pub mod output;
pub mod preload;
pub mod theme;

#[cfg(test)]
mod tests;
