/// orbview - terminal model viewer
///
/// Shows OBJ models (or a demo plane with an orbiting sphere) in the
/// terminal.
/// Controls:
///   - A/D, W/S: Spin the orbit; Space stops it
///   - Arrow Keys: Nudge the camera
///   - I: Ambient light, L: Wireframe, P: Pick
///   - Q/ESC: Quit
use anyhow::{bail, Context};
use clap::Parser;
use orbview_core::load_models;
use orbview_terminal::{demo_scene, describe_report, AppConfig, CliArgs, TerminalApp};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    } else {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("orbview_core=debug,orbview_terminal=debug"),
        )
        .init();
    }

    let config: AppConfig = args.into();

    let (meshes, bounds) = if config.models.is_empty() {
        if config.info_only {
            bail!("--info needs at least one model file");
        }
        log::info!("No models given, showing the demo scene");
        (demo_scene(config.load.hit_policy), None)
    } else {
        let report = load_models(&config.models, &config.load);
        if config.info_only {
            print!("{}", describe_report(&report));
            if report.models.is_empty() {
                bail!("no model could be loaded");
            }
            return Ok(());
        }
        for failure in &report.failures {
            eprintln!("skipping: {}", failure);
        }
        if report.models.is_empty() {
            bail!("none of the {} model files could be loaded", config.models.len());
        }
        let bounds = report.bounds();
        (report.into_meshes(), bounds)
    };

    let mut app = TerminalApp::new(meshes, bounds, &config).context("Failed to query the terminal size")?;
    app.run().context("Terminal renderer failed")?;

    Ok(())
}
