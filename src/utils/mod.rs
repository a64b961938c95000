pub mod logging;

/// 把任意标识转换为安全的文件名
///
/// 保留字母、数字（含中文）、`-` 和 `_`，其余字符替换为 `_`
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("张三 (2班)"), "张三__2班_");
        assert_eq!(sanitize_file_name("../etc"), "___etc");
        assert_eq!(sanitize_file_name("  "), "unnamed");
    }
}
