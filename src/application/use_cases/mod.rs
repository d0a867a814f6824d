pub mod pipeline;
pub mod profiler;
pub mod stats_export;
pub mod summary;
