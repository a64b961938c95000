//! 批量结果处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量学生结果的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建日志文件、输出目录，按需创建阅卷 API 客户端
//! 2. **批量加载**：从本地目录或阅卷 API 加载所有学生结果
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将学生结果分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总所有学生的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个学生的细节，委托 student_processor

use crate::clients::GradingClient;
use crate::config::Config;
use crate::models::load_all_result_files;
use crate::orchestrator::student_processor::{self, StudentJob};
use crate::services::ReviewWriter;
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_startup, log_students_loaded,
    print_final_stats,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    client: Option<GradingClient>,
    review_writer: Arc<ReviewWriter>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(config.max_concurrent_files);

        tokio::fs::create_dir_all(&config.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", config.output_folder))?;

        // 只有指定了批次才需要访问阅卷 API
        let client = match config.grading_batch_id {
            Some(_) => Some(GradingClient::new(&config)?),
            None => None,
        };

        let review_writer = Arc::new(ReviewWriter::with_path(config.review_file.clone()));

        Ok(Self {
            config,
            client,
            review_writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        // 加载所有待处理的学生结果
        let jobs = self.load_jobs().await?;

        if jobs.is_empty() {
            warn!("⚠️ 没有找到待处理的学生结果，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_students_loaded(jobs.len(), self.config.max_concurrent_files);

        // 处理所有学生
        let stats = self.process_all_students(jobs).await?;

        // 输出最终统计
        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            stats.review_entries,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 加载学生结果：指定批次时从阅卷 API 拉取，否则扫描本地目录
    async fn load_jobs(&self) -> Result<Vec<StudentJob>> {
        let mut jobs = Vec::new();

        if let (Some(client), Some(batch_id)) = (&self.client, &self.config.grading_batch_id) {
            info!("\n🌐 正在从阅卷 API 拉取批次 {} ...", batch_id);
            let batch = client
                .fetch_batch_results(batch_id)
                .await
                .with_context(|| format!("拉取批次 {} 失败", batch_id))?;
            let source = batch.batch_id.clone();
            for student in batch.into_students() {
                jobs.push(StudentJob::new(jobs.len() + 1, source.as_str(), student));
            }
            student_processor::assign_output_stems(&mut jobs);
            return Ok(jobs);
        }

        info!("\n📁 正在扫描待处理的结果文件...");
        let files = load_all_result_files(&self.config.input_folder).await?;
        for file in files {
            let source = file.stem();
            for student in file.students {
                jobs.push(StudentJob::new(jobs.len() + 1, source.as_str(), student));
            }
        }
        student_processor::assign_output_stems(&mut jobs);

        Ok(jobs)
    }

    /// 处理所有学生
    async fn process_all_students(&self, jobs: Vec<StudentJob>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_files;
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = jobs.len();
        let total_batches = total.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        let mut remaining = jobs.into_iter();
        let mut batch_start = 0;

        // 分批处理
        while batch_start < total {
            let batch: Vec<StudentJob> = remaining.by_ref().take(batch_size).collect();
            let batch_end = batch_start + batch.len();
            let batch_num = batch_start / batch_size + 1;

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total);

            let batch_result = self.process_batch(batch, semaphore.clone()).await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;
            stats.review_entries += batch_result.review_entries;

            log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );

            batch_start = batch_end;
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: Vec<StudentJob>,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for job in batch {
            let index = job.index;
            let permit = semaphore.clone().acquire_owned().await?;
            let config = self.config.clone();
            let review_writer = Arc::clone(&self.review_writer);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                student_processor::process_student(job, &config, &review_writer).await
            });
            batch_handles.push((index, handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();
        let outcomes = futures::future::join_all(
            batch_handles.into_iter().map(|(index, handle)| async move { (index, handle.await) }),
        )
        .await;

        for (index, outcome) in outcomes {
            match outcome {
                Ok(Ok(outcome)) => {
                    result.success += 1;
                    result.review_entries += outcome.review_entries;
                }
                Ok(Err(e)) => {
                    error!("[学生 {}] ❌ 处理过程中发生错误: {:#}", index, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[学生 {}] 任务执行失败: {}", index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    pub review_entries: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
    review_entries: usize,
}
