use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 数据解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 阅卷 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 不支持的文件格式
    #[error("不支持的文件格式: {path}")]
    UnsupportedFormat { path: String },
}

/// 数据解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 内容既不是学生结果，也不是批次结果或题目数组
    #[error("无法识别的结果文件结构 ({path}): {source}")]
    UnknownShape {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 阅卷 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// API 返回空结果
    #[error("API返回空结果: {endpoint}")]
    EmptyResponse { endpoint: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置项取值非法
    #[error("配置项 {name} 取值非法: {reason}")]
    InvalidValue { name: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(ParseError::Json {
            path: String::new(),
            source: err,
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Parse(ParseError::Toml {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|url| url.to_string())
            .unwrap_or_default();
        AppError::Api(ApiError::RequestFailed {
            endpoint,
            source: err,
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建 JSON 解析错误
    pub fn json_parse_failed(path: impl Into<String>, source: serde_json::Error) -> Self {
        AppError::Parse(ParseError::Json {
            path: path.into(),
            source,
        })
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(path: impl Into<String>, source: toml::de::Error) -> Self {
        AppError::Parse(ParseError::Toml {
            path: path.into(),
            source,
        })
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested_error() {
        let err: AppError = FileError::NotFound {
            path: "results/a.json".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "文件错误: 文件不存在: results/a.json");
    }

    #[test]
    fn test_json_error_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::json_parse_failed("x.json", source);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("x.json"));
    }
}
