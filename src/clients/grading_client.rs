/// 阅卷 API 客户端
///
/// 封装所有与阅卷服务相关的调用逻辑
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::student_result::{BatchResults, ResultDocument};
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::{debug, warn};

/// 阅卷 API 客户端
pub struct GradingClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GradingClient {
    /// 创建新的阅卷客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::api_request_failed(&config.grading_api_base_url, e))?;

        Ok(Self {
            http,
            base_url: config.grading_api_base_url.trim_end_matches('/').to_string(),
            token: config.grading_api_token.clone(),
        })
    }

    /// 批次结果接口地址
    pub fn batch_results_url(&self, batch_id: &str) -> String {
        format!("{}/api/batch/{}/results", self.base_url, batch_id.trim())
    }

    /// 拉取一个批次的全部批改结果
    ///
    /// # 参数
    /// - `batch_id`: 批次ID
    ///
    /// # 返回
    /// 返回批次结果；接口只返回学生列表或题目数组时也会包装成批次
    pub async fn fetch_batch_results(&self, batch_id: &str) -> AppResult<BatchResults> {
        let url = self.batch_results_url(batch_id);
        debug!("正在请求阅卷结果: {}", url);

        let mut request = self.http.get(&url).header(ACCEPT, "application/json");
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        if !status.is_success() {
            warn!("阅卷 API 返回错误状态: {} ({})", status, url);
            return Err(ApiError::BadResponse {
                endpoint: url,
                status: status.as_u16(),
                message: Some(body).filter(|b| !b.trim().is_empty()),
            }
            .into());
        }

        if body.trim().is_empty() {
            return Err(ApiError::EmptyResponse { endpoint: url }.into());
        }

        parse_batch_body(&body, batch_id).map_err(|e| AppError::json_parse_failed(url, e))
    }
}

/// 解析批次接口返回内容
fn parse_batch_body(body: &str, batch_id: &str) -> Result<BatchResults, serde_json::Error> {
    let document: ResultDocument = serde_json::from_str(body)?;
    let batch = match document {
        ResultDocument::Batch(mut batch) => {
            if batch.batch_id.trim().is_empty() {
                batch.batch_id = batch_id.to_string();
            }
            batch
        }
        other => BatchResults {
            batch_id: batch_id.to_string(),
            grading_mode: None,
            students: other.into_students(batch_id),
        },
    };
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_results_url_trims_slashes() {
        let config = Config {
            grading_api_base_url: "http://localhost:8001/".to_string(),
            ..Config::default()
        };
        let client = GradingClient::new(&config).unwrap();
        assert_eq!(
            client.batch_results_url(" b-1 "),
            "http://localhost:8001/api/batch/b-1/results"
        );
    }

    #[test]
    fn test_parse_batch_body_wraps_student() {
        let body = r#"{"studentKey": "s1", "questionResults": []}"#;
        let batch = parse_batch_body(body, "b9").unwrap();
        assert_eq!(batch.batch_id, "b9");
        assert_eq!(batch.students.len(), 1);
        assert_eq!(batch.students[0].student_key, "s1");
    }

    #[test]
    fn test_parse_batch_body_keeps_batch() {
        let body = r#"{"batch_id": "", "grading_mode": "assist", "results": []}"#;
        let batch = parse_batch_body(body, "b2").unwrap();
        assert_eq!(batch.batch_id, "b2");
        assert!(batch.grading_mode.is_some());
        assert!(batch.students.is_empty());
    }
}
