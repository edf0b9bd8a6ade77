pub mod batch;

pub use batch::{download, fetch_batch, fetch_batch_with};
