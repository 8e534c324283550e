pub mod jobs;
pub mod runs;
mod session;
