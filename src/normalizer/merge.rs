use super::scoring_points::{merge_scoring_points, total_awarded};
use crate::models::question_result::{non_empty, QuestionResult};
use tracing::debug;

/// 多段文字合并时使用的分隔符（全角分号）
pub const TEXT_SEPARATOR: &str = "；";

/// 合并同一道题的多个片段
///
/// # 参数
/// - `members`: 同一规范题号下的片段，按输入顺序排列，至少一个
/// - `question_id`: 输出显示的题号
///
/// # 返回
/// 返回新的合并结果，不修改任何输入
pub fn merge_group(members: &[&QuestionResult], question_id: &str) -> QuestionResult {
    let Some(first) = members.first() else {
        return QuestionResult {
            question_id: question_id.to_string(),
            ..Default::default()
        };
    };

    let mut merged = QuestionResult::clone(first);
    merged.question_id = question_id.to_string();

    if members.len() == 1 {
        return merged;
    }

    debug!("合并题目 {}: {} 个片段", question_id, members.len());

    merged.max_score = max_of(members.iter().filter_map(|m| m.max_score));
    merged.feedback = first_non_empty(members, |m| m.feedback.as_deref());
    merged.question_type = first_non_empty(members, |m| m.question_type.as_deref());
    merged.student_answer = first_non_empty(members, |m| m.student_answer.as_deref());
    merged.confidence = min_of(members.iter().filter_map(|m| m.confidence));
    merged.confidence_reason = join_distinct(members, |m| m.confidence_reason.as_deref());
    merged.self_critique = join_distinct(members, |m| m.self_critique.as_deref());
    merged.self_critique_confidence =
        min_of(members.iter().filter_map(|m| m.self_critique_confidence));
    merged.rubric_refs = union_strings(members, |m| m.rubric_refs.as_deref());
    merged.typo_notes = union_strings(members, |m| m.typo_notes.as_deref());
    merged.merge_source = union_strings(members, |m| m.merge_source.as_deref());
    merged.page_indices = union_pages(members);
    merged.is_cross_page = members.iter().any(|m| m.is_cross_page);

    let has_points = members.iter().any(|m| !m.scoring_point_results.is_empty());
    if has_points {
        merged.scoring_point_results = merge_scoring_points(members);
        merged.score = Some(total_awarded(&merged.scoring_point_results));
    } else {
        // 保留第一个片段的旧版得分点
        merged.scoring_point_results = Vec::new();
        merged.scoring_points = first.scoring_points.clone();
        merged.score = max_of(members.iter().filter_map(|m| m.score));
    }

    merged
}

fn max_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

fn min_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
}

fn first_non_empty<'a>(
    members: &[&'a QuestionResult],
    field: impl Fn(&'a QuestionResult) -> Option<&'a str>,
) -> Option<String> {
    members
        .iter()
        .find_map(|m| non_empty(field(*m)))
        .map(str::to_string)
}

fn join_distinct<'a>(
    members: &[&'a QuestionResult],
    field: impl Fn(&'a QuestionResult) -> Option<&'a str>,
) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for member in members {
        if let Some(text) = non_empty(field(*member)) {
            let text = text.trim();
            if !parts.contains(&text) {
                parts.push(text);
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(TEXT_SEPARATOR))
    }
}

fn union_strings<'a>(
    members: &[&'a QuestionResult],
    field: impl Fn(&'a QuestionResult) -> Option<&'a [String]>,
) -> Option<Vec<String>> {
    let mut union: Vec<String> = Vec::new();
    for member in members {
        for item in field(*member).unwrap_or_default() {
            if !union.contains(item) {
                union.push(item.clone());
            }
        }
    }
    if union.is_empty() {
        None
    } else {
        Some(union)
    }
}

fn union_pages(members: &[&QuestionResult]) -> Vec<u32> {
    let mut pages: Vec<u32> = members
        .iter()
        .flat_map(|m| m.page_indices.iter().copied())
        .collect();
    pages.sort_unstable();
    pages.dedup();
    pages
}
