mod analyze;
mod evaluate;

pub use analyze::{analyze, AnalyzeOptions, ClusterAnalysis};
pub use evaluate::{evaluate, DatasetEvaluation};
