use {clap::Parser, std::process::ExitCode};

#[tokio::main]
async fn main() -> ExitCode {
    let args = deployer::arguments::Arguments::parse();
    observe::tracing::initialize(&args.logging.to_config());
    tracing::debug!("running gm-deploy with validated arguments:\n{}", args);
    deployer::main(args).await
}
