//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量结果处理器
//! - 管理应用生命周期（初始化、运行）
//! - 从本地目录或阅卷 API 加载学生结果
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `student_processor` - 单个学生处理器
//! - 规范化一名学生的题目结果
//! - 重新计算总分，写出 JSON
//! - 追加复核清单
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<StudentResult>)
//!     ↓
//! student_processor (处理 Vec<QuestionResult>)
//!     ↓
//! normalizer (纯函数：合并 / 排序)
//!     ↓
//! services (能力层：summary / review)
//! ```

pub mod batch_processor;
pub mod student_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use student_processor::{
    assign_output_stems, normalize_student, process_student, NormalizedStudent, StudentJob,
    StudentOutcome,
};
