use super::grading_mode::GradingMode;
use super::lenient;
use serde::{Deserialize, Serialize};

/// 单道题（或题目片段）的批改结果
///
/// 跨页的题目可能被拆成多个片段分别批改，所以同一个 `question_id`
/// 在一份学生结果中可能出现多次，需要经过 `normalizer` 合并。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    #[serde(alias = "question_id", default, deserialize_with = "lenient::identifier")]
    pub question_id: String,

    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(alias = "max_score", default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,

    #[serde(alias = "question_type", default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,

    #[serde(alias = "student_answer", default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub student_answer: Option<String>,

    /// 0-1
    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(alias = "confidence_reason", default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub confidence_reason: Option<String>,

    #[serde(alias = "self_critique", default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub self_critique: Option<String>,

    #[serde(alias = "self_critique_confidence", default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub self_critique_confidence: Option<f64>,

    #[serde(alias = "rubric_refs", default, deserialize_with = "lenient::text_list", skip_serializing_if = "Option::is_none")]
    pub rubric_refs: Option<Vec<String>>,

    #[serde(alias = "typo_notes", default, deserialize_with = "lenient::text_list", skip_serializing_if = "Option::is_none")]
    pub typo_notes: Option<Vec<String>>,

    /// 从 0 开始的页码
    #[serde(alias = "page_indices", default, deserialize_with = "lenient::page_indices")]
    pub page_indices: Vec<u32>,

    #[serde(alias = "is_cross_page", default, deserialize_with = "lenient::flag")]
    pub is_cross_page: bool,

    /// 合并来源：参与合并的原始片段标识
    #[serde(alias = "merge_source", default, deserialize_with = "lenient::text_list", skip_serializing_if = "Option::is_none")]
    pub merge_source: Option<Vec<String>>,

    #[serde(alias = "scoring_point_results", default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub scoring_point_results: Vec<ScoringPointResult>,

    /// 旧版得分点格式，只在没有 `scoring_point_results` 时使用
    #[serde(alias = "scoring_points", default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub scoring_points: Vec<ScoringPoint>,
}

impl QuestionResult {
    pub fn new(question_id: impl Into<String>, score: f64, max_score: f64) -> Self {
        Self {
            question_id: question_id.into(),
            score: Some(score),
            max_score: Some(max_score),
            ..Default::default()
        }
    }

    /// 满分为 0 即为辅助模式
    pub fn grading_mode(&self) -> GradingMode {
        GradingMode::from_max_score(self.max_score)
    }

    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    pub fn max_score_or_zero(&self) -> f64 {
        self.max_score.unwrap_or(0.0)
    }
}

/// 得分点判定结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringPointResult {
    #[serde(alias = "point_id", default, deserialize_with = "lenient::optional_identifier", skip_serializing_if = "Option::is_none")]
    pub point_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub awarded: f64,

    #[serde(alias = "max_points", default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub max_points: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,

    #[serde(alias = "scoring_point", default, deserialize_with = "lenient::optional_record", skip_serializing_if = "Option::is_none")]
    pub scoring_point: Option<ScoringPointRef>,
}

impl ScoringPointResult {
    pub fn new(point_id: impl Into<String>, awarded: f64, max_points: f64) -> Self {
        Self {
            point_id: Some(point_id.into()),
            awarded,
            max_points: Some(max_points),
            ..Default::default()
        }
    }

    /// 得分点描述，优先使用嵌套评分标准中的描述
    pub fn effective_description(&self) -> Option<&str> {
        self.scoring_point
            .as_ref()
            .and_then(|sp| non_empty(sp.description.as_deref()))
            .or_else(|| non_empty(self.description.as_deref()))
    }

    /// 证据文本长度（按字符计）
    pub fn evidence_len(&self) -> usize {
        self.evidence.as_deref().map_or(0, |e| e.chars().count())
    }
}

/// 得分点所引用的评分标准条目
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringPointRef {
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// 旧版得分点
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringPoint {
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub score: f64,

    #[serde(alias = "max_score", default, deserialize_with = "lenient::number_or_zero")]
    pub max_score: f64,

    #[serde(default, deserialize_with = "lenient::text_or_empty")]
    pub description: String,

    #[serde(alias = "is_correct", default, deserialize_with = "lenient::flag")]
    pub is_correct: bool,

    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// 去掉首尾空白后非空才返回
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
