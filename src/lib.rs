pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod publish;
pub mod supabase;
