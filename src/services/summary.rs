//! 成绩汇总服务 - 业务能力层
//!
//! 只根据规范化后的题目结果计算统计信息，不关心结果从哪里来

use crate::models::grading_mode::GradingMode;
use crate::models::question_result::QuestionResult;
use serde::Serialize;

/// 一名学生的成绩汇总
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub grading_mode: GradingMode,
    /// 辅助模式下为 None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_total_score: Option<f64>,
    pub question_count: usize,
    pub cross_page_count: usize,
    /// 由多个片段合并而来的题目数
    pub merged_count: usize,
    /// 置信度低于阈值的题号
    pub low_confidence: Vec<LowConfidence>,
}

/// 低置信度题目
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowConfidence {
    pub question_id: String,
    pub confidence: f64,
}

impl ResultSummary {
    /// 根据规范化后的结果计算汇总
    ///
    /// # 参数
    /// - `results`: 规范化后的题目结果
    /// - `mode`: 阅卷模式
    /// - `merged_count`: 合并产生的题目数
    /// - `low_confidence_threshold`: 低于该置信度的题目进入复核
    pub fn from_results(
        results: &[QuestionResult],
        mode: GradingMode,
        merged_count: usize,
        low_confidence_threshold: f64,
    ) -> Self {
        let (total_score, max_total_score) = match mode {
            GradingMode::Scored => (
                Some(results.iter().map(QuestionResult::score_or_zero).sum::<f64>()),
                Some(results.iter().map(QuestionResult::max_score_or_zero).sum::<f64>()),
            ),
            GradingMode::Assist => (None, None),
        };

        let low_confidence = results
            .iter()
            .filter_map(|q| {
                q.confidence
                    .filter(|c| *c < low_confidence_threshold)
                    .map(|confidence| LowConfidence {
                        question_id: q.question_id.clone(),
                        confidence,
                    })
            })
            .collect();

        Self {
            grading_mode: mode,
            total_score,
            max_total_score,
            question_count: results.len(),
            cross_page_count: results
                .iter()
                .filter(|q| q.is_cross_page || q.page_indices.len() > 1)
                .count(),
            merged_count,
            low_confidence,
        }
    }

    /// 得分率（百分比），辅助模式或满分为 0 时为 None
    pub fn score_rate(&self) -> Option<f64> {
        match (self.total_score, self.max_total_score) {
            (Some(total), Some(max)) if max > 0.0 => Some(total * 100.0 / max),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<QuestionResult> {
        vec![
            QuestionResult {
                confidence: Some(0.95),
                ..QuestionResult::new("1", 2.0, 3.0)
            },
            QuestionResult {
                confidence: Some(0.4),
                page_indices: vec![1, 2],
                ..QuestionResult::new("2", 4.0, 5.0)
            },
            QuestionResult {
                score: None,
                is_cross_page: true,
                ..QuestionResult::new("3", 0.0, 2.0)
            },
        ]
    }

    #[test]
    fn test_scored_summary() {
        let summary = ResultSummary::from_results(&results(), GradingMode::Scored, 1, 0.7);
        assert_eq!(summary.total_score, Some(6.0));
        assert_eq!(summary.max_total_score, Some(10.0));
        assert_eq!(summary.question_count, 3);
        assert_eq!(summary.cross_page_count, 2);
        assert_eq!(summary.merged_count, 1);
        assert_eq!(
            summary.low_confidence,
            vec![LowConfidence {
                question_id: "2".to_string(),
                confidence: 0.4,
            }]
        );
        assert_eq!(summary.score_rate(), Some(60.0));
    }

    #[test]
    fn test_assist_summary_has_no_totals() {
        let summary = ResultSummary::from_results(&results(), GradingMode::Assist, 0, 0.7);
        assert_eq!(summary.total_score, None);
        assert_eq!(summary.max_total_score, None);
        assert_eq!(summary.score_rate(), None);
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("totalScore").is_none());
        assert_eq!(value["gradingMode"], "assist");
    }
}
