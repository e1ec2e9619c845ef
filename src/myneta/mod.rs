// src/myneta/mod.rs
pub mod client;
pub mod links;
pub mod models;

pub use client::MynetaClient;
pub use models::{CandidateLink, ConstituencyLink, Site};
