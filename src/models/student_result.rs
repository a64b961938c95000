use super::grading_mode::GradingMode;
use super::lenient;
use super::question_result::QuestionResult;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 一名学生的全部批改结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    #[serde(
        alias = "student_key",
        alias = "studentId",
        alias = "student_id",
        default,
        deserialize_with = "lenient::identifier"
    )]
    pub student_key: String,

    #[serde(alias = "student_name", default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,

    /// 缺失时按题目满分推断
    #[serde(alias = "grading_mode", default, deserialize_with = "lenient::optional_record", skip_serializing_if = "Option::is_none")]
    pub grading_mode: Option<GradingMode>,

    #[serde(alias = "total_score", default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,

    #[serde(alias = "max_total_score", default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub max_total_score: Option<f64>,

    #[serde(alias = "question_results", alias = "questionDetails", alias = "question_details", deserialize_with = "lenient::list")]
    pub question_results: Vec<QuestionResult>,
}

impl StudentResult {
    /// 用一组题目结果构造匿名学生结果
    pub fn from_questions(student_key: impl Into<String>, question_results: Vec<QuestionResult>) -> Self {
        Self {
            student_key: student_key.into(),
            question_results,
            ..Default::default()
        }
    }

    /// 实际生效的阅卷模式
    ///
    /// 显式声明优先；否则只要所有题目满分都为 0 就视为辅助模式
    pub fn effective_mode(&self) -> GradingMode {
        if let Some(mode) = self.grading_mode {
            return mode;
        }
        let all_assist = !self.question_results.is_empty()
            && self
                .question_results
                .iter()
                .all(|q| q.grading_mode().is_assist());
        if all_assist {
            GradingMode::Assist
        } else {
            GradingMode::Scored
        }
    }

    /// 日志里显示用的名字
    pub fn display_name(&self) -> String {
        match self.student_name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(name) => format!("{}({})", name, self.student_key),
            None => self.student_key.clone(),
        }
    }
}

/// 一个批次的批改结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResults {
    #[serde(alias = "batch_id", default, deserialize_with = "lenient::identifier")]
    pub batch_id: String,

    #[serde(alias = "grading_mode", default, deserialize_with = "lenient::optional_record", skip_serializing_if = "Option::is_none")]
    pub grading_mode: Option<GradingMode>,

    #[serde(alias = "results", deserialize_with = "lenient::list")]
    pub students: Vec<StudentResult>,
}

impl BatchResults {
    /// 拆分为学生结果
    ///
    /// 批次级的阅卷模式下发给未声明模式的学生；没有学生标识的按位置命名为
    /// `{批次ID}_{序号}`（序号从 1 开始），保证同一批次内标识互不相同
    pub fn into_students(self) -> Vec<StudentResult> {
        let mode = self.grading_mode;
        let prefix = if self.batch_id.trim().is_empty() {
            "student".to_string()
        } else {
            self.batch_id.trim().to_string()
        };
        self.students
            .into_iter()
            .enumerate()
            .map(|(index, mut student)| {
                if student.grading_mode.is_none() {
                    student.grading_mode = mode;
                }
                if student.student_key.trim().is_empty() {
                    student.student_key = format!("{}_{}", prefix, index + 1);
                }
                student
            })
            .collect()
    }
}

/// 结果文件的三种形态：批次、单个学生、题目数组
#[derive(Debug, Clone)]
pub enum ResultDocument {
    Batch(BatchResults),
    Student(StudentResult),
    Questions(Vec<QuestionResult>),
}

impl<'de> Deserialize<'de> for ResultDocument {
    /// 按顶层结构判断形态：数组为题目列表，含 `students` / `results` 的对象为批次，
    /// 其余对象为单个学生
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_batch = value
            .as_object()
            .is_some_and(|map| map.contains_key("students") || map.contains_key("results"));
        match value {
            Value::Array(_) => lenient::list(value)
                .map(ResultDocument::Questions)
                .map_err(de::Error::custom),
            Value::Object(_) if is_batch => serde_json::from_value(value)
                .map(ResultDocument::Batch)
                .map_err(de::Error::custom),
            Value::Object(_) => serde_json::from_value(value)
                .map(ResultDocument::Student)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(format!(
                "结果文件顶层必须是对象或数组，实际为: {}",
                other
            ))),
        }
    }
}

impl ResultDocument {
    /// 统一转换为学生结果列表
    ///
    /// # 参数
    /// - `fallback_key`: 缺少学生标识或批次ID时使用（通常是文件名）
    pub fn into_students(self, fallback_key: &str) -> Vec<StudentResult> {
        match self {
            ResultDocument::Batch(mut batch) => {
                if batch.batch_id.trim().is_empty() {
                    batch.batch_id = fallback_key.to_string();
                }
                batch.into_students()
            }
            ResultDocument::Student(mut student) => {
                if student.student_key.trim().is_empty() {
                    student.student_key = fallback_key.to_string();
                }
                vec![student]
            }
            ResultDocument::Questions(questions) => {
                vec![StudentResult::from_questions(fallback_key, questions)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_detects_batch() {
        let json = r#"{
            "batchId": "b1",
            "gradingMode": "assist_only",
            "students": [
                {"studentKey": "s1", "questionResults": [{"questionId": "1", "score": 0, "maxScore": 0}]},
                {"studentKey": "s2", "gradingMode": "scored", "questionResults": []}
            ]
        }"#;
        let doc: ResultDocument = serde_json::from_str(json).unwrap();
        let students = doc.into_students("file");
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].grading_mode, Some(GradingMode::Assist));
        assert_eq!(students[1].grading_mode, Some(GradingMode::Scored));
    }

    #[test]
    fn test_document_detects_student_with_snake_case() {
        let json = r#"{
            "student_id": 42,
            "student_name": "张三",
            "question_details": [{"question_id": "Q1", "score": 2, "max_score": 3}]
        }"#;
        let doc: ResultDocument = serde_json::from_str(json).unwrap();
        let students = doc.into_students("file");
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].student_key, "42");
        assert_eq!(students[0].display_name(), "张三(42)");
        assert_eq!(students[0].question_results[0].question_id, "Q1");
    }

    #[test]
    fn test_document_detects_bare_question_list() {
        let json = r#"[{"questionId": "1", "score": 1, "maxScore": 2}]"#;
        let doc: ResultDocument = serde_json::from_str(json).unwrap();
        let students = doc.into_students("paper_03");
        assert_eq!(students[0].student_key, "paper_03");
        assert_eq!(students[0].question_results.len(), 1);
    }

    #[test]
    fn test_effective_mode_inferred_from_questions() {
        let student = StudentResult::from_questions(
            "s",
            vec![QuestionResult::new("1", 0.0, 0.0), QuestionResult::new("2", 0.0, 0.0)],
        );
        assert_eq!(student.effective_mode(), GradingMode::Assist);

        let student = StudentResult::from_questions(
            "s",
            vec![QuestionResult::new("1", 0.0, 0.0), QuestionResult::new("2", 1.0, 2.0)],
        );
        assert_eq!(student.effective_mode(), GradingMode::Scored);
        assert_eq!(StudentResult::default().effective_mode(), GradingMode::Scored);
    }

    #[test]
    fn test_keyless_batch_students_get_positional_keys() {
        let json = r#"{"students": [
            {"studentName": "A", "questionResults": []},
            {"studentKey": "  ", "studentName": "B", "questionResults": []},
            {"studentKey": "s3", "questionResults": []}
        ]}"#;
        let doc: ResultDocument = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = doc
            .into_students("class2")
            .into_iter()
            .map(|s| s.student_key)
            .collect();
        assert_eq!(keys, vec!["class2_1", "class2_2", "s3"]);

        let batch = BatchResults {
            students: vec![StudentResult::default()],
            ..Default::default()
        };
        assert_eq!(batch.into_students()[0].student_key, "student_1");
    }

    #[test]
    fn test_malformed_fields_do_not_reject_student() {
        let json = r#"{
            "studentKey": "s1",
            "studentName": 7,
            "gradingMode": 3,
            "questionResults": [
                {"questionId": "1", "score": 1, "maxScore": 2,
                 "scoringPointResults": null, "scoringPoints": null,
                 "feedback": 5, "rubricRefs": [1, 2], "isCrossPage": 1.0},
                "not a question",
                {"questionId": "2", "score": "x", "maxScore": 2, "pageIndices": "0"}
            ]
        }"#;
        let doc: ResultDocument = serde_json::from_str(json).unwrap();
        let student = doc.into_students("file").remove(0);
        assert_eq!(student.student_name, None);
        assert_eq!(student.grading_mode, None);
        assert_eq!(student.question_results.len(), 2);

        let q = &student.question_results[0];
        assert!(q.scoring_point_results.is_empty());
        assert!(q.scoring_points.is_empty());
        assert_eq!(q.feedback, None);
        assert_eq!(q.rubric_refs, Some(vec!["1".to_string(), "2".to_string()]));
        assert!(q.is_cross_page);
        assert_eq!(student.question_results[1].score, None);
        assert!(student.question_results[1].page_indices.is_empty());
    }

    #[test]
    fn test_bare_array_is_never_read_as_batch() {
        let json = r#"[{"questionId": "1"}, {"questionId": "2"}, {"questionId": "3"}]"#;
        let doc: ResultDocument = serde_json::from_str(json).unwrap();
        assert!(matches!(doc, ResultDocument::Questions(ref q) if q.len() == 3));
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        assert!(serde_json::from_str::<ResultDocument>("42").is_err());
        assert!(serde_json::from_str::<ResultDocument>(r#"{"foo": 1}"#).is_err());
    }
}
