use spending_charts::args::Args;
use spending_charts::pipeline;
use spending_charts::render::SvgRasterizer;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    if let Err(err) = pipeline::run(&args, &SvgRasterizer::new(), Path::new(".")) {
        eprintln!("failed to generate charts: {}", err);
        process::exit(1);
    }
}
