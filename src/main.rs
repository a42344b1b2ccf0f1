use clap::Parser;
use student_portal::app;
use student_portal::config::Config;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::debug!("configuration: {:?}", config);

    if let Err(e) = app::run(config).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
