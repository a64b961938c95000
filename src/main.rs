use anyhow::Result;
use grading_review::utils::logging;
use grading_review::{App, Config};

/// 可选的配置文件，环境变量优先
const CONFIG_FILE: &str = "grading_review.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::load(CONFIG_FILE)?;

    // 初始化并运行应用
    let _stats = App::initialize(config).await?.run().await?;

    Ok(())
}
