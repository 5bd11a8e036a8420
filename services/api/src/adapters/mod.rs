pub mod db;
pub mod pipeline;

pub use db::DbAdapter;
pub use pipeline::JobQueueAdapter;
