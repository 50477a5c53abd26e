pub mod api;
pub mod dto;
pub mod entity;
pub mod error;
pub mod infra;
pub mod repository;
pub mod service;
pub mod validation;
pub mod workload;

pub use error::{Error, Result};
