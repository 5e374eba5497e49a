pub mod assignment;
pub mod dispatch;
pub mod renderer;
pub mod reporting;
pub mod retry;
