use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 待处理的结果文件目录（JSON / TOML）
    pub input_folder: String,
    /// 规范化结果的输出目录
    pub output_folder: String,
    /// 同时处理的学生文件数量
    pub max_concurrent_files: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 待复核清单文件
    pub review_file: String,
    /// 置信度低于该值的题目进入复核清单
    pub low_confidence_threshold: f64,
    // --- 阅卷 API 配置 ---
    pub grading_api_base_url: String,
    pub grading_api_token: String,
    /// 设置后从阅卷 API 拉取该批次，而不是读取本地目录
    pub grading_batch_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: "grading_results".to_string(),
            output_folder: "normalized_results".to_string(),
            max_concurrent_files: 8,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            review_file: "review.txt".to_string(),
            low_confidence_threshold: 0.7,
            grading_api_base_url: "http://127.0.0.1:8001".to_string(),
            grading_api_token: String::new(),
            grading_batch_id: None,
        }
    }
}

/// `grading_review.toml` 中允许出现的字段，全部可选
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    input_folder: Option<String>,
    output_folder: Option<String>,
    max_concurrent_files: Option<usize>,
    verbose_logging: Option<bool>,
    output_log_file: Option<String>,
    review_file: Option<String>,
    low_confidence_threshold: Option<f64>,
    grading_api_base_url: Option<String>,
    grading_api_token: Option<String>,
    grading_batch_id: Option<String>,
}

impl Config {
    /// 以默认值为基础，只读取环境变量
    ///
    /// 数值或布尔值无法解析时返回 `ConfigError::EnvVarParseFailed`
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// 先读取 TOML 配置文件，再用环境变量覆盖
    ///
    /// 文件不存在时以默认值为基础
    pub fn load(toml_path: impl AsRef<Path>) -> AppResult<Self> {
        let path = toml_path.as_ref();
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            let mut config = Self::from_toml_str(&content)
                .map_err(|e| AppError::toml_parse_failed(path.display().to_string(), e))?;
            config.apply_env()?;
            config
        } else {
            Self::from_env()?
        };
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文本解析配置，未出现的字段使用默认值
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            input_folder: file.input_folder.unwrap_or(default.input_folder),
            output_folder: file.output_folder.unwrap_or(default.output_folder),
            max_concurrent_files: file.max_concurrent_files.unwrap_or(default.max_concurrent_files),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
            output_log_file: file.output_log_file.unwrap_or(default.output_log_file),
            review_file: file.review_file.unwrap_or(default.review_file),
            low_confidence_threshold: file.low_confidence_threshold.unwrap_or(default.low_confidence_threshold),
            grading_api_base_url: file.grading_api_base_url.unwrap_or(default.grading_api_base_url),
            grading_api_token: file.grading_api_token.unwrap_or(default.grading_api_token),
            grading_batch_id: file.grading_batch_id.filter(|v| !v.trim().is_empty()),
        })
    }

    /// 只有显式设置的环境变量才覆盖文件配置；数值无法解析时报错
    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(v) = std::env::var("INPUT_FOLDER") {
            self.input_folder = v;
        }
        if let Ok(v) = std::env::var("OUTPUT_FOLDER") {
            self.output_folder = v;
        }
        if let Some(v) = parse_env("MAX_CONCURRENT_FILES", "usize")? {
            self.max_concurrent_files = v;
        }
        if let Some(v) = parse_env("VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        if let Ok(v) = std::env::var("OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }
        if let Ok(v) = std::env::var("REVIEW_FILE") {
            self.review_file = v;
        }
        if let Some(v) = parse_env("LOW_CONFIDENCE_THRESHOLD", "f64")? {
            self.low_confidence_threshold = v;
        }
        if let Ok(v) = std::env::var("GRADING_API_BASE_URL") {
            self.grading_api_base_url = v;
        }
        if let Ok(v) = std::env::var("GRADING_API_TOKEN") {
            self.grading_api_token = v;
        }
        if let Ok(v) = std::env::var("GRADING_BATCH_ID") {
            if !v.trim().is_empty() {
                self.grading_batch_id = Some(v);
            }
        }
        Ok(())
    }

    /// 校验配置取值
    pub fn validate(&self) -> AppResult<()> {
        if self.max_concurrent_files == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_concurrent_files".to_string(),
                reason: "必须大于 0".to_string(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(ConfigError::InvalidValue {
                name: "low_confidence_threshold".to_string(),
                reason: format!("{} 不在 [0, 1] 范围内", self.low_confidence_threshold),
            }
            .into());
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}
