//! # Grading Review
//!
//! 整理 AI 阅卷结果的 Rust 程序：合并跨页拆分的题目片段、统一题号、
//! 按自然顺序排序，并生成复核清单
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 阅卷结果的数据结构，读取时统一吸收 camelCase / snake_case 差异
//! - `GradingMode` - 计分 / 辅助模式，在读取数据时一次性确定
//! - `loaders` - 从 JSON / TOML 文件加载学生结果
//!
//! ### ② 规范化层（Normalizer）
//! - `normalizer/` - 纯函数，不修改输入
//! - `question_id` - 题号规范化与自然排序
//! - `merge` / `scoring_points` - 同一道题多个片段的字段合并
//!
//! ### ③ 业务能力层（Services / Clients）
//! - `ResultSummary` - 总分、低置信度统计
//! - `ReviewWriter` - 写 review.txt 能力
//! - `GradingClient` - 从阅卷 API 拉取批次结果
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理器，管理并发
//! - `orchestrator/student_processor` - 单个学生处理器
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::GradingClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{GradingMode, QuestionResult, ScoringPointResult, StudentResult};
pub use normalizer::{normalize, normalize_with_report, NormalizeIssue, NormalizeReport};
pub use orchestrator::{App, ProcessingStats};
