pub mod claims;
pub mod dto;
pub mod errors;
pub(crate) mod extractors;
pub mod form;
pub mod handlers;
pub mod jwt;
#[cfg(test)]
pub(crate) mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
