use std::io;
use std::process;
use std::sync::Arc;

use clap::Parser;
use log::{ debug, error, info };

use sphere_tracer::Result;
use sphere_tracer::canvas::Canvas;
use sphere_tracer::config::RenderConfig;
use sphere_tracer::parallel::parallel_render;
use sphere_tracer::scene::Scene;
use sphere_tracer::sink::{ DisplaySink, JsonLinesSink };

fn render(config: &RenderConfig, sink: &mut dyn DisplaySink) -> Result<()> {
    let scene = Scene::demo(config.width, config.height)?
        .with_samples(config.samples)?;

    if config.sequential {
        scene.render_sequential(sink)
    } else {
        parallel_render(Arc::new(scene), config.pool_settings()?, sink)
            .map(|_| ())
    }
}

fn run() -> Result<()> {
    let config = RenderConfig::parse();
    config.validate()?;
    debug!("Configuration: {}", serde_json::to_string(&config)?);

    if config.stream {
        let stdout = io::stdout();
        let mut sink = JsonLinesSink::new(stdout.lock());
        return render(&config, &mut sink);
    }

    let mut canvas = Canvas::new(config.width, config.height);
    render(&config, &mut canvas)?;
    let format = config.image_format();
    canvas.save(&config.output, format)?;
    info!("Saved {} as {:?}", config.output.display(), format);

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        eprintln!("sphere-tracer: {}", e);
        process::exit(1);
    }
}
