/// Example: print a coarse depth map of a model by casting picking rays
///
/// Usage: cargo run --example pick -- path/to/model.obj
use std::env;

use orbview_core::{load_models, LoadOptions, Scene, NO_INTERSECTION};
use orbview_terminal::demo_scene;

const COLUMNS: u32 = 60;
const ROWS: u32 = 24;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths: Vec<String> = env::args().skip(1).collect();
    let options = LoadOptions::default();
    let mut scene = Scene::for_terminal(COLUMNS, ROWS);

    let meshes = if paths.is_empty() {
        println!("No model given, using the demo scene");
        demo_scene(options.hit_policy)
    } else {
        let report = load_models(&paths, &options);
        for failure in &report.failures {
            eprintln!("skipping: {}", failure);
        }
        if let Some(bounds) = report.bounds() {
            scene.fit_to_bounds(bounds);
        }
        report.into_meshes()
    };

    let shades = ['@', '%', '#', '*', '+', '=', '-', ':', '.'];
    let (near, far) = (scene.camera.near, scene.camera.far);

    for row in 0..ROWS {
        let ndc_y = 1.0 - 2.0 * (row as f32 + 0.5) / ROWS as f32;
        let line: String = (0..COLUMNS)
            .map(|column| {
                let ndc_x = 2.0 * (column as f32 + 0.5) / COLUMNS as f32 - 1.0;
                let Some((origin, dir)) = scene.ray_through(ndc_x, ndc_y) else {
                    return ' ';
                };
                let t = meshes
                    .iter()
                    .map(|mesh| mesh.intersect(&origin, &dir, 0.0))
                    .fold(NO_INTERSECTION, f32::min);
                if t >= NO_INTERSECTION {
                    return ' ';
                }
                let depth = ((t - near) / (far - near)).clamp(0.0, 1.0);
                shades[((depth * shades.len() as f32) as usize).min(shades.len() - 1)]
            })
            .collect();
        println!("{}", line);
    }

    Ok(())
}
