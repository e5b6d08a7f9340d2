pub mod supabase;
pub mod types;

pub use supabase::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot reach the data store: {0}")]
    Transport(String),

    #[error("Data store returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Row not found: {0}")]
    NotFound(String),

    #[error("Unexpected row shape: {0}")]
    Decode(String),
}
