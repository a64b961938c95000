pub mod grading_mode;
pub mod lenient;
pub mod loaders;
pub mod question_result;
pub mod student_result;

pub use grading_mode::GradingMode;
pub use loaders::{load_all_result_files, load_result_file, LoadedFile};
pub use question_result::{QuestionResult, ScoringPoint, ScoringPointRef, ScoringPointResult};
pub use student_result::{BatchResults, ResultDocument, StudentResult};
