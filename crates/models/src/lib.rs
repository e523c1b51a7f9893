pub mod errors;
pub mod db;
pub mod service;
pub mod menu_item;
pub mod service_configuration;
pub mod service_selection;

#[cfg(test)]
mod tests;
