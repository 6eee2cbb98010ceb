use clap::Parser;

use vidgate::config::{self, Args, StaticConfig};
use vidgate::runtime;
use vidgate::system::init_logging;

#[actix_web::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if args.generate_config {
        print!("{}", StaticConfig::generate_sample_config());
        return std::process::ExitCode::SUCCESS;
    }

    config::init_config_from(&args.config);
    let loaded_config = config::get_config();

    // guard 必须存活到进程结束，否则日志丢尾
    let _guard = init_logging(&loaded_config);

    match runtime::server::run_server(&args).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<vidgate::errors::VidgateError>() {
                eprintln!("{}", err.format_colored());
            } else {
                eprintln!("[ERROR] {}", e);
            }
            std::process::ExitCode::FAILURE
        }
    }
}
