//! 命令行参数解析

use clap::Parser;

/// Video landing short-link service
#[derive(Debug, Parser)]
#[command(name = "vidgate", version, about)]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// 覆盖监听地址
    #[arg(long)]
    pub host: Option<String>,

    /// 覆盖监听端口
    #[arg(long)]
    pub port: Option<u16>,

    /// 输出示例配置到 stdout 后退出
    #[arg(long)]
    pub generate_config: bool,
}
