//! 复核清单写入服务 - 业务能力层
//!
//! 只负责"写 review.txt"能力，不关心流程

use crate::error::{AppError, AppResult};
use crate::normalizer::NormalizeIssue;
use crate::services::summary::LowConfidence;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// 复核清单写入服务
///
/// 职责：
/// - 将需要人工复核的题目写入 review.txt
/// - 一名学生的所有条目一次性写入，多个任务并发追加时不会交错
pub struct ReviewWriter {
    review_file_path: String,
}

impl ReviewWriter {
    /// 使用指定的文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            review_file_path: path.into(),
        }
    }

    /// 生成一名学生的复核条目
    ///
    /// 只包含需要复核的问题和低置信度题目，合并提示不会写入
    pub fn format_entries(
        student: &str,
        issues: &[NormalizeIssue],
        low_confidence: &[LowConfidence],
    ) -> Vec<String> {
        let mut lines: Vec<String> = issues
            .iter()
            .filter(|issue| issue.needs_review())
            .map(|issue| format!("学生 {} | {}", student, issue))
            .collect();

        lines.extend(low_confidence.iter().map(|item| {
            format!(
                "学生 {} | 题 {} 置信度偏低: {:.2}",
                student, item.question_id, item.confidence
            )
        }));

        lines
    }

    /// 写入复核条目
    ///
    /// # 返回
    /// 返回写入的条目数
    pub fn write(
        &self,
        student: &str,
        issues: &[NormalizeIssue],
        low_confidence: &[LowConfidence],
    ) -> AppResult<usize> {
        let lines = Self::format_entries(student, issues, low_confidence);
        if lines.is_empty() {
            return Ok(0);
        }

        debug!("写入复核条目: 学生 {} | {} 条", student, lines.len());

        let mut block = lines.join("\n");
        block.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.review_file_path)
            .map_err(|e| AppError::file_write_failed(&self.review_file_path, e))?;

        file.write_all(block.as_bytes())
            .map_err(|e| AppError::file_write_failed(&self.review_file_path, e))?;

        Ok(lines.len())
    }
}
