//! 单个学生结果处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理一名学生的全部题目结果，是学生级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **规范化**：调用 `normalizer` 合并跨页片段、统一题号和顺序
//! 2. **汇总**：重新计算总分、标记低置信度题目
//! 3. **输出**：把规范化结果写成 JSON 文件
//! 4. **复核清单**：把需要人工复核的条目追加到 review.txt
//! 5. **统计输出**：记录题目数、合并数和复核条目数

use crate::config::Config;
use crate::models::grading_mode::GradingMode;
use crate::models::student_result::StudentResult;
use crate::normalizer::{normalize_with_report, NormalizeIssue};
use crate::services::{ResultSummary, ReviewWriter};
use crate::utils::logging::{append_log_line, truncate_text};
use crate::utils::sanitize_file_name;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 一份待处理的学生结果
#[derive(Debug, Clone)]
pub struct StudentJob {
    /// 序号（从 1 开始，仅用于日志显示）
    pub index: usize,
    /// 来源（文件名或批次ID），用作输出文件名前缀
    pub source: String,
    pub student: StudentResult,
    /// 输出文件名（不含扩展名），同一次运行内唯一
    pub output_stem: String,
}

impl StudentJob {
    pub fn new(index: usize, source: impl Into<String>, student: StudentResult) -> Self {
        let source = source.into();
        let output_stem = output_stem(&source, &student.student_key);
        Self {
            index,
            source,
            student,
            output_stem,
        }
    }
}

/// 规范化后的学生结果，即输出文件的内容
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStudent {
    pub student: StudentResult,
    pub summary: ResultSummary,
    pub issues: Vec<NormalizeIssue>,
}

/// 单个学生的处理结果
#[derive(Debug, Clone)]
pub struct StudentOutcome {
    pub output_path: PathBuf,
    pub summary: ResultSummary,
    pub review_entries: usize,
}

/// 规范化一名学生的结果（纯函数）
///
/// # 参数
/// - `student`: 原始学生结果
/// - `low_confidence_threshold`: 低置信度阈值
pub fn normalize_student(student: &StudentResult, low_confidence_threshold: f64) -> NormalizedStudent {
    let mode = student.effective_mode();
    let report = normalize_with_report(&student.question_results);

    let issues: Vec<NormalizeIssue> = report
        .issues
        .into_iter()
        .filter(|issue| mode == GradingMode::Scored || !issue.is_score_related())
        .collect();

    let merged_count = issues
        .iter()
        .filter(|issue| matches!(issue, NormalizeIssue::Merged { .. }))
        .count();

    let summary = ResultSummary::from_results(
        &report.results,
        mode,
        merged_count,
        low_confidence_threshold,
    );

    let normalized = StudentResult {
        student_key: student.student_key.clone(),
        student_name: student.student_name.clone(),
        grading_mode: Some(mode),
        total_score: summary.total_score,
        max_total_score: summary.max_total_score,
        question_results: report.results,
    };

    NormalizedStudent {
        student: normalized,
        summary,
        issues,
    }
}

/// 输出文件名：`{来源}_{学生标识}`，两部分都经过文件名清洗
pub fn output_stem(source: &str, student_key: &str) -> String {
    format!(
        "{}_{}",
        sanitize_file_name(source),
        sanitize_file_name(student_key)
    )
}

/// 让所有任务的输出文件名互不相同
///
/// 清洗后重名的（例如 `s/1` 与 `s_1`）从第二个起依次追加 `_2`、`_3`……
/// 必须在并发处理开始前调用。
pub fn assign_output_stems(jobs: &mut [StudentJob]) {
    let mut used: HashSet<String> = HashSet::new();
    for job in jobs.iter_mut() {
        let base = output_stem(&job.source, &job.student.student_key);
        let mut stem = base.clone();
        let mut suffix = 2;
        while !used.insert(stem.clone()) {
            stem = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if stem != base {
            warn!(
                "[学生 {}] 输出文件名 {} 已被占用，改为 {}",
                job.index, base, stem
            );
        }
        job.output_stem = stem;
    }
}

/// 输出文件路径：`{输出目录}/{输出文件名}.json`
pub fn output_path(output_folder: &str, output_stem: &str) -> PathBuf {
    Path::new(output_folder).join(format!("{}.json", output_stem))
}

/// 处理一名学生的结果
///
/// # 参数
/// - `job`: 待处理的学生结果
/// - `config`: 配置
/// - `review_writer`: 复核清单写入服务
///
/// # 返回
/// 返回输出路径和汇总信息
pub async fn process_student(
    job: StudentJob,
    config: &Config,
    review_writer: &ReviewWriter,
) -> Result<StudentOutcome> {
    let name = job.student.display_name();
    log_student_start(job.index, &name, &job.source, job.student.question_results.len());

    let normalized = normalize_student(&job.student, config.low_confidence_threshold);

    if config.verbose_logging {
        log_questions(job.index, &normalized);
    }
    for issue in normalized.issues.iter().filter(|i| i.needs_review()) {
        warn!("[学生 {}] ⚠️ {}", job.index, issue);
    }

    // 写出规范化结果
    let path = output_path(&config.output_folder, &job.output_stem);
    let json = serde_json::to_string_pretty(&normalized)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("无法写入结果文件: {}", path.display()))?;
    debug!("[学生 {}] 结果已写入: {}", job.index, path.display());

    // 写入复核清单
    let review_entries = review_writer.write(
        &name,
        &normalized.issues,
        &normalized.summary.low_confidence,
    )?;

    append_log_line(
        &config.output_log_file,
        &format_log_line(&name, &normalized.summary, review_entries),
    )?;

    log_student_complete(job.index, &normalized.summary, review_entries);

    Ok(StudentOutcome {
        output_path: path,
        summary: normalized.summary,
        review_entries,
    })
}

fn format_log_line(name: &str, summary: &ResultSummary, review_entries: usize) -> String {
    let score = match (summary.total_score, summary.max_total_score) {
        (Some(total), Some(max)) => format!("{}/{}", total, max),
        _ => "辅助模式".to_string(),
    };
    format!(
        "学生 {} | 得分 {} | 题目 {} | 合并 {} | 待复核 {}",
        name, score, summary.question_count, summary.merged_count, review_entries
    )
}

// ========== 日志辅助函数 ==========

fn log_student_start(index: usize, name: &str, source: &str, fragment_count: usize) {
    info!("[学生 {}] 开始处理", index);
    info!("[学生 {}] 名称: {}", index, name);
    info!("[学生 {}] 来源: {}", index, source);
    info!("[学生 {}] 原始结果条数: {}", index, fragment_count);
}

fn log_questions(index: usize, normalized: &NormalizedStudent) {
    for q in &normalized.student.question_results {
        info!(
            "[学生 {}]   题 {} | 得分 {:?}/{:?} | 页码 {:?} | {}",
            index,
            q.question_id,
            q.score,
            q.max_score,
            q.page_indices,
            truncate_text(q.feedback.as_deref().unwrap_or(""), 40)
        );
    }
}

fn log_student_complete(index: usize, summary: &ResultSummary, review_entries: usize) {
    info!(
        "[学生 {}] 题目统计: 共 {} 题, 合并 {}, 跨页 {}, 待复核 {}",
        index,
        summary.question_count,
        summary.merged_count,
        summary.cross_page_count,
        review_entries
    );
    if let Some(rate) = summary.score_rate() {
        info!("[学生 {}] 得分率: {:.1}%", index, rate);
    }
    info!("[学生 {}] ✅ 处理完成\n", index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question_result::QuestionResult;

    fn student(mode: Option<GradingMode>) -> StudentResult {
        StudentResult {
            student_key: "s1".to_string(),
            student_name: Some("李四".to_string()),
            grading_mode: mode,
            total_score: Some(99.0),
            max_total_score: None,
            question_results: vec![
                QuestionResult {
                    score: None,
                    ..QuestionResult::new("第2题", 0.0, 4.0)
                },
                QuestionResult {
                    page_indices: vec![0],
                    confidence: Some(0.5),
                    ..QuestionResult::new("1", 1.0, 3.0)
                },
                QuestionResult {
                    page_indices: vec![1],
                    ..QuestionResult::new("Q1", 2.0, 3.0)
                },
            ],
        }
    }

    #[test]
    fn test_normalize_student_recomputes_totals() {
        let normalized = normalize_student(&student(None), 0.7);
        let ids: Vec<_> = normalized
            .student
            .question_results
            .iter()
            .map(|q| q.question_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(normalized.student.total_score, Some(2.0));
        assert_eq!(normalized.student.max_total_score, Some(7.0));
        assert_eq!(normalized.student.grading_mode, Some(GradingMode::Scored));
        assert_eq!(normalized.summary.merged_count, 1);
        assert_eq!(normalized.summary.low_confidence.len(), 1);
        assert!(normalized
            .issues
            .iter()
            .any(|i| matches!(i, NormalizeIssue::MissingScore { .. })));
    }

    #[test]
    fn test_assist_mode_drops_score_issues() {
        let normalized = normalize_student(&student(Some(GradingMode::Assist)), 0.7);
        assert_eq!(normalized.student.total_score, None);
        assert!(!normalized.issues.iter().any(|i| i.is_score_related()));
    }

    #[test]
    fn test_output_path_is_sanitized() {
        let job = StudentJob::new(1, "batch 1", StudentResult::from_questions("s/1", Vec::new()));
        assert_eq!(job.output_stem, "batch_1_s_1");
        assert_eq!(
            output_path("out", &job.output_stem),
            Path::new("out").join("batch_1_s_1.json")
        );
    }

    #[test]
    fn test_assign_output_stems_resolves_collisions() {
        let mut jobs: Vec<StudentJob> = ["s/1", "s_1", "s 1", "s_1_2", "s2"]
            .iter()
            .enumerate()
            .map(|(i, key)| {
                StudentJob::new(i + 1, "c", StudentResult::from_questions(*key, Vec::new()))
            })
            .collect();
        assign_output_stems(&mut jobs);

        let stems: Vec<_> = jobs.iter().map(|j| j.output_stem.as_str()).collect();
        assert_eq!(stems, vec!["c_s_1", "c_s_1_2", "c_s_1_3", "c_s_1_2_2", "c_s2"]);
    }

    #[tokio::test]
    async fn test_process_student_writes_files() {
        let dir = std::env::temp_dir().join(format!("grading_review_student_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let config = Config {
            output_folder: dir.to_string_lossy().to_string(),
            output_log_file: dir.join("output.txt").to_string_lossy().to_string(),
            review_file: dir.join("review.txt").to_string_lossy().to_string(),
            ..Config::default()
        };
        let writer = ReviewWriter::with_path(config.review_file.clone());
        let job = StudentJob::new(1, "paper", student(None));

        let outcome = process_student(job, &config, &writer).await.unwrap();
        assert_eq!(outcome.output_path, dir.join("paper_s1.json"));
        // 缺少得分 + 低置信度
        assert_eq!(outcome.review_entries, 2);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&outcome.output_path).unwrap()).unwrap();
        assert_eq!(written["student"]["questionResults"][0]["questionId"], "1");
        assert_eq!(written["summary"]["questionCount"], 2);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
