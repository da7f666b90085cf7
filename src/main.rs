use anyhow::Result;
use clap::Parser;
use runtask::cli::Args;
use runtask::display::AnsiRenderer;
use runtask::driver::Driver;
use runtask::launch::build_requests;
use runtask::rpc::ClusterRpcClient;
use runtask::runtime::config::ServiceConfig;
use runtask::runtime::telemetry::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    args.validate()?;

    let config = ServiceConfig::from_env()?;

    // Every override file is read and parsed before the first request
    // goes out; a bad file aborts with nothing submitted.
    let requests = build_requests(
        &args.cluster,
        args.count,
        &args.task_definition,
        &args.overrides,
    )?;

    let client = ClusterRpcClient::from_config(&config)?;
    let mut driver = Driver::new(client, AnsiRenderer::stdout(), config.poll_interval());
    let board = driver.run(&args.cluster, &requests, args.join).await?;

    let telemetry = driver.telemetry().snapshot();
    let rpc = driver.api().metrics();
    tracing::debug!(
        tasks = board.len(),
        launched = telemetry.tasks_launched,
        launch_failures = telemetry.launch_failures,
        describe_rounds = telemetry.describe_rounds,
        rpc_requests = rpc.total_requests,
        rpc_errors = rpc.total_errors,
        "invocation complete"
    );

    Ok(())
}
