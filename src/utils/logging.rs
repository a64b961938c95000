/// 日志工具模块
///
/// 提供日志初始化、日志文件和输出格式化的辅助函数
use crate::error::{AppError, AppResult};
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化控制台日志
///
/// 日志级别由 `RUST_LOG` 控制，默认 info；重复调用不会报错
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n阅卷结果规范化日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> AppResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    writeln!(file, "{}", line).map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
pub fn log_startup(max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 阅卷结果规范化");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录结果加载信息
///
/// # 参数
/// - `total`: 学生结果总数
/// - `max_concurrent`: 最大并发数
pub fn log_students_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 份待处理的学生结果", total);
    info!("📋 将以每批 {} 份的方式处理", max_concurrent);
    info!("💡 每批完成后再开始下一批\n");
}

/// 记录批次开始信息
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批学生: {}-{} / 共 {} 份", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `review_entries`: 写入复核清单的条目数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    success: usize,
    failed: usize,
    total: usize,
    review_entries: usize,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("📝 待复核条目: {}", review_entries);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("第二问缺少单位", 3), "第二问...");
        assert_eq!(truncate_text("短", 3), "短");
    }

    #[test]
    fn test_log_file_header_and_append() {
        let path = std::env::temp_dir().join(format!("grading_review_log_{}.txt", std::process::id()));
        let path_str = path.to_string_lossy().to_string();

        init_log_file(&path_str).unwrap();
        append_log_line(&path_str, "学生 s1 | 总分 3/5").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("阅卷结果规范化日志"));
        assert!(content.ends_with("学生 s1 | 总分 3/5\n"));

        let _ = std::fs::remove_file(&path);
    }
}
