use crate::models::question_result::{non_empty, QuestionResult, ScoringPointResult};
use std::collections::HashMap;

/// 得分点合并键
///
/// 有 `point_id` 用 id，否则用描述，都没有时用（片段序号, 得分点序号），
/// 后者保证匿名得分点互不冲突。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PointKey {
    Id(String),
    Description(String),
    Position { member: usize, point: usize },
}

impl PointKey {
    fn of(point: &ScoringPointResult, member: usize, index: usize) -> Self {
        if let Some(id) = non_empty(point.point_id.as_deref()) {
            return PointKey::Id(id.trim().to_string());
        }
        if let Some(description) = point.effective_description() {
            return PointKey::Description(description.trim().to_string());
        }
        PointKey::Position {
            member,
            point: index,
        }
    }
}

/// 同一得分点出现多次时，候选是否应当替换已有结果
///
/// 得分高者优先；得分相同取证据更长的一条
fn should_replace(existing: &ScoringPointResult, candidate: &ScoringPointResult) -> bool {
    if candidate.awarded != existing.awarded {
        return candidate.awarded > existing.awarded;
    }
    candidate.evidence_len() > existing.evidence_len()
}

/// 合并同一道题各片段的得分点
///
/// 输出顺序为每个键第一次出现的顺序；被替换的得分点保持原位置。
pub fn merge_scoring_points(members: &[&QuestionResult]) -> Vec<ScoringPointResult> {
    let mut merged: Vec<ScoringPointResult> = Vec::new();
    let mut slots: HashMap<PointKey, usize> = HashMap::new();

    for (member_index, member) in members.iter().enumerate() {
        for (point_index, point) in member.scoring_point_results.iter().enumerate() {
            let key = PointKey::of(point, member_index, point_index);
            match slots.get(&key) {
                Some(&slot) => {
                    if should_replace(&merged[slot], point) {
                        merged[slot] = point.clone();
                    }
                }
                None => {
                    slots.insert(key, merged.len());
                    merged.push(point.clone());
                }
            }
        }
    }

    merged
}

/// 合并后得分点的总得分
pub fn total_awarded(points: &[ScoringPointResult]) -> f64 {
    points.iter().map(|p| p.awarded).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question_result::ScoringPointRef;

    fn fragment(points: Vec<ScoringPointResult>) -> QuestionResult {
        QuestionResult {
            scoring_point_results: points,
            ..QuestionResult::new("1", 0.0, 5.0)
        }
    }

    fn described(description: &str, awarded: f64) -> ScoringPointResult {
        ScoringPointResult {
            description: Some(description.to_string()),
            awarded,
            ..Default::default()
        }
    }

    #[test]
    fn test_higher_awarded_wins() {
        let a = fragment(vec![ScoringPointResult::new("a", 1.0, 3.0)]);
        let b = fragment(vec![ScoringPointResult::new("a", 3.0, 3.0)]);
        let merged = merge_scoring_points(&[&a, &b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].awarded, 3.0);
    }

    #[test]
    fn test_tie_keeps_longer_evidence() {
        let mut short = ScoringPointResult::new("a", 2.0, 2.0);
        short.evidence = Some("x=1".to_string());
        let mut long = ScoringPointResult::new("a", 2.0, 2.0);
        long.evidence = Some("由题意得 x=1，代入检验成立".to_string());

        let a = fragment(vec![short.clone()]);
        let b = fragment(vec![long.clone()]);
        assert_eq!(merge_scoring_points(&[&a, &b])[0].evidence, long.evidence);
        assert_eq!(merge_scoring_points(&[&b, &a])[0].evidence, long.evidence);
    }

    #[test]
    fn test_full_tie_keeps_first() {
        let mut first = ScoringPointResult::new("a", 1.0, 1.0);
        first.reason = Some("first".to_string());
        let mut second = ScoringPointResult::new("a", 1.0, 1.0);
        second.reason = Some("second".to_string());
        let a = fragment(vec![first]);
        let b = fragment(vec![second]);
        assert_eq!(merge_scoring_points(&[&a, &b])[0].reason.as_deref(), Some("first"));
    }

    #[test]
    fn test_keys_fall_back_to_description_then_position() {
        let nested = ScoringPointResult {
            description: Some("外层描述".to_string()),
            scoring_point: Some(ScoringPointRef {
                description: Some("单位正确".to_string()),
                score: Some(1.0),
            }),
            awarded: 0.0,
            ..Default::default()
        };
        let a = fragment(vec![nested, ScoringPointResult::default()]);
        let b = fragment(vec![described("单位正确", 1.0), ScoringPointResult::default()]);

        let merged = merge_scoring_points(&[&a, &b]);
        // 描述相同的合并为一条，匿名得分点各自保留
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].awarded, 1.0);
        assert_eq!(total_awarded(&merged), 1.0);
    }

    #[test]
    fn test_preserves_first_occurrence_order() {
        let a = fragment(vec![
            ScoringPointResult::new("b", 0.0, 1.0),
            ScoringPointResult::new("a", 0.0, 1.0),
        ]);
        let b = fragment(vec![
            ScoringPointResult::new("c", 1.0, 1.0),
            ScoringPointResult::new("b", 1.0, 1.0),
        ]);
        let merged = merge_scoring_points(&[&a, &b]);
        let ids: Vec<_> = merged.iter().map(|p| p.point_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(merged[0].awarded, 1.0);
    }
}
