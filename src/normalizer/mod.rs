//! 题目结果规范化
//!
//! ## 职责
//!
//! 把一名学生的原始题目结果（可能因跨页被拆成多个片段）整理成
//! 题号唯一、顺序确定的列表。
//!
//! ## 处理步骤
//!
//! 1. **题号规范化**：`第1题` / `Q1` / `1.` → `1`（见 `question_id`）
//! 2. **分组**：按规范题号分组，组内保持输入顺序
//! 3. **合并**：单片段直接输出，多片段按字段规则合并（见 `merge`）
//! 4. **得分点合并**：按 id / 描述 / 位置去重（见 `scoring_points`）
//! 5. **排序**：按题号的自然顺序排序，`unknown` 排在最后
//!
//! 纯函数：不修改输入，不依赖时间或外部状态，可在任意线程调用。

pub mod merge;
pub mod question_id;
pub mod scoring_points;

use crate::models::grading_mode::GradingMode;
use crate::models::question_result::QuestionResult;
use question_id::{canonical_key, display_id, OrderKey, UNKNOWN_KEY};
use serde::Serialize;
use std::collections::HashMap;

pub use merge::merge_group;

/// 规范化过程中发现的数据问题
///
/// 这些问题不会中断规范化，但需要暴露给调用方，避免掩盖上游阅卷服务的缺陷。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizeIssue {
    /// 题号无法识别，归入 `unknown` 分组
    UnknownQuestionId { position: usize, raw: String },
    /// 计分模式下缺少得分
    MissingScore { position: usize, question_id: String },
    /// 缺少满分
    MissingMaxScore { position: usize, question_id: String },
    /// 多个片段被合并为一道题
    Merged { question_id: String, fragments: usize },
}

impl NormalizeIssue {
    /// 是否需要人工复核（合并只是提示信息）
    pub fn needs_review(&self) -> bool {
        !matches!(self, NormalizeIssue::Merged { .. })
    }

    /// 是否与分数缺失有关，辅助模式下可以忽略
    pub fn is_score_related(&self) -> bool {
        matches!(
            self,
            NormalizeIssue::MissingScore { .. } | NormalizeIssue::MissingMaxScore { .. }
        )
    }
}

impl std::fmt::Display for NormalizeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeIssue::UnknownQuestionId { position, raw } => {
                write!(f, "第 {} 条结果题号无法识别: {:?}", position + 1, raw)
            }
            NormalizeIssue::MissingScore {
                position,
                question_id,
            } => write!(f, "第 {} 条结果 (题 {}) 缺少得分", position + 1, question_id),
            NormalizeIssue::MissingMaxScore {
                position,
                question_id,
            } => write!(f, "第 {} 条结果 (题 {}) 缺少满分", position + 1, question_id),
            NormalizeIssue::Merged {
                question_id,
                fragments,
            } => write!(f, "题 {} 由 {} 个片段合并", question_id, fragments),
        }
    }
}

/// 规范化结果
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub results: Vec<QuestionResult>,
    pub issues: Vec<NormalizeIssue>,
}

impl NormalizeReport {
    /// 需要人工复核的问题
    pub fn review_issues(&self) -> impl Iterator<Item = &NormalizeIssue> {
        self.issues.iter().filter(|i| i.needs_review())
    }
}

/// 同一规范题号下的片段
struct Group<'a> {
    key: String,
    display: String,
    members: Vec<&'a QuestionResult>,
}

/// 规范化题目结果列表
///
/// 输入可以为空；不修改输入，返回全新的列表。
pub fn normalize(results: &[QuestionResult]) -> Vec<QuestionResult> {
    normalize_with_report(results).results
}

/// 规范化题目结果列表，同时返回发现的数据问题
pub fn normalize_with_report(results: &[QuestionResult]) -> NormalizeReport {
    let mut issues = Vec::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for (position, result) in results.iter().enumerate() {
        let key = canonical_key(&result.question_id);
        let display = display_id(&result.question_id, &key);

        if key == UNKNOWN_KEY {
            issues.push(NormalizeIssue::UnknownQuestionId {
                position,
                raw: result.question_id.clone(),
            });
        }
        if result.max_score.is_none() {
            issues.push(NormalizeIssue::MissingMaxScore {
                position,
                question_id: display.clone(),
            });
        }
        if result.score.is_none() && result.grading_mode() == GradingMode::Scored {
            issues.push(NormalizeIssue::MissingScore {
                position,
                question_id: display.clone(),
            });
        }

        match group_index.get(&key) {
            Some(&index) => groups[index].members.push(result),
            None => {
                group_index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    display,
                    members: vec![result],
                });
            }
        }
    }

    groups.sort_by_cached_key(|g| OrderKey::parse(&g.key));

    let mut merged = Vec::with_capacity(groups.len());
    for group in &groups {
        if group.members.len() > 1 {
            issues.push(NormalizeIssue::Merged {
                question_id: group.display.clone(),
                fragments: group.members.len(),
            });
        }
        merged.push(merge_group(&group.members, &group.display));
    }

    NormalizeReport {
        results: merged,
        issues,
    }
}
