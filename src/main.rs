use anyhow::Context;
use clap::Parser;
use log::info;

use scene_tracer::cli::Args;
use scene_tracer::output::save_picture;
use scene_tracer::render::render_frame;
use scene_tracer::scene::Scene;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(args.debug_level.clone().into())
        .parse_default_env()
        .init();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring render threads")?;
    }

    let scene = Scene::read_file(&args.scene)
        .with_context(|| format!("loading scene {}", args.scene.display()))?;

    info!(target: "app", "Starting recursive ray tracing");
    let picture = render_frame(&scene);

    let output = args.output.as_ref().unwrap_or(&scene.output);
    save_picture(&picture, output).with_context(|| format!("saving image {}", output.display()))?;
    info!(target: "app", "Recursive ray tracing completed");
    Ok(())
}
