pub mod use_cases;

pub use use_cases::pipeline::{PipelineReport, PipelineUseCase};
pub use use_cases::summary::SummaryUseCase;
