use crate::error::{AppError, AppResult, FileError, ParseError};
use crate::models::student_result::{ResultDocument, StudentResult};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 一个结果文件加载后的内容
#[derive(Debug, Clone)]
pub struct LoadedFile {
    /// 文件路径
    pub path: PathBuf,
    /// 文件中的学生结果
    pub students: Vec<StudentResult>,
}

impl LoadedFile {
    /// 不含扩展名的文件名，用作输出文件名前缀
    pub fn stem(&self) -> String {
        file_stem(&self.path)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "results".to_string())
}

/// 是否为支持的结果文件（.json / .toml）
pub fn is_result_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("json") | Some("toml")
    )
}

/// 按文件格式解析结果文档
///
/// # 参数
/// - `content`: 文件内容
/// - `path`: 文件路径（决定格式，同时用于错误信息）
pub fn parse_result_document(content: &str, path: &Path) -> AppResult<ResultDocument> {
    let path_str = path.display().to_string();
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content).map_err(|e| {
            if e.is_data() {
                AppError::Parse(ParseError::UnknownShape {
                    path: path_str,
                    source: e,
                })
            } else {
                AppError::json_parse_failed(path_str, e)
            }
        }),
        Some("toml") => {
            toml::from_str(content).map_err(|e| AppError::toml_parse_failed(path_str, e))
        }
        _ => Err(FileError::UnsupportedFormat { path: path_str }.into()),
    }
}

/// 加载单个结果文件
pub async fn load_result_file(path: &Path) -> AppResult<LoadedFile> {
    if !path.exists() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let document = parse_result_document(&content, path)?;
    let students = document.into_students(&file_stem(path));

    Ok(LoadedFile {
        path: path.to_path_buf(),
        students,
    })
}

/// 从文件夹中加载所有结果文件
///
/// 解析失败的文件只记录警告并跳过；返回结果按文件名排序
pub async fn load_all_result_files(folder_path: &str) -> AppResult<Vec<LoadedFile>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        if is_result_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut loaded = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_result_file(&path).await {
            Ok(file) => {
                let question_count: usize = file
                    .students
                    .iter()
                    .map(|s| s.question_results.len())
                    .sum();
                tracing::info!(
                    "成功加载 {} 名学生, {} 条题目结果",
                    file.students.len(),
                    question_count
                );
                loaded.push(file);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(loaded)
}
