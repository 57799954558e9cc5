/// Terminal viewer: orbiting camera, model meshes and keyboard controls
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::{Vector2, Vector3};
use orbview_core::{HitPolicy, LoadReport, Mesh, MeshKind, SceneBounds, Scene, Texture};
use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt::Write as _;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;

pub use config::{AppConfig, CliArgs};
pub use renderer::AsciiRenderer;

/// Step for the arrow-key nudges, in radians
const NUDGE: f32 = 0.1;

const HELP: &str = "A/D pan  W/S tilt  Space stop  I ambient  L wire  P pick  Q quit";

/// Closest mesh under the screen centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    pub index: usize,
    pub kind: MeshKind,
    pub distance: f32,
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    meshes: Vec<Mesh>,
    scene: Scene,
    renderer: AsciiRenderer,
    running: bool,
    frame_time: Duration,
    start: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    status: String,
}

impl TerminalApp {
    pub fn new(meshes: Vec<Mesh>, bounds: Option<SceneBounds>, config: &AppConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(meshes, bounds, config, width, height))
    }

    /// App for a fixed viewport of `columns` x `rows` cells
    pub fn with_size(
        meshes: Vec<Mesh>,
        bounds: Option<SceneBounds>,
        config: &AppConfig,
        columns: u16,
        rows: u16,
    ) -> Self {
        let mut scene = Scene::for_terminal(columns as u32, rows as u32);
        if let Some(bounds) = bounds {
            scene.fit_to_bounds(bounds);
        }

        let now = Instant::now();
        Self {
            meshes,
            scene,
            renderer: AsciiRenderer::new(columns as usize, rows as usize),
            running: true,
            frame_time: config.frame_time,
            start: now,
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
            status: String::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let mut previous = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Update
            self.update((frame_start - previous).as_secs_f32());
            previous = frame_start;

            // Render
            self.render_frame(self.start.elapsed().as_secs_f64());
            self.present()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Resize(width, height) => {
                self.scene.resize(width as u32, height as u32);
                self.renderer.resize(width as usize, height as usize);
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let orbit = &mut self.scene.orbit;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('a') => orbit.pan_rate = -PI,
            KeyCode::Char('d') => orbit.pan_rate = PI,
            KeyCode::Char('w') => orbit.tilt_rate = FRAC_PI_2,
            KeyCode::Char('s') => orbit.tilt_rate = -FRAC_PI_2,
            KeyCode::Char(' ') => orbit.stop(),
            KeyCode::Left => orbit.rotate(-NUDGE, 0.0),
            KeyCode::Right => orbit.rotate(NUDGE, 0.0),
            KeyCode::Up => orbit.rotate(0.0, NUDGE),
            KeyCode::Down => orbit.rotate(0.0, -NUDGE),
            KeyCode::Char('i') => {
                self.scene.light.cycle_ambient();
                self.status = format!("ambient {:.1}", self.scene.light.ambient);
            }
            KeyCode::Char('l') => {
                self.renderer.toggle_wireframe();
                self.status = if self.renderer.wireframe() {
                    "wireframe".to_string()
                } else {
                    "shaded".to_string()
                };
            }
            KeyCode::Char('p') => {
                self.status = match self.pick() {
                    Some(pick) => format!("picked {} #{} at {:.1}", pick.kind, pick.index, pick.distance),
                    None => "nothing under the cursor".to_string(),
                };
            }
            _ => {}
        }
    }

    /// Advance the orbit by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        self.scene.update(dt);
    }

    /// Nearest mesh hit by the ray through the centre of the screen
    pub fn pick(&self) -> Option<Pick> {
        let (origin, dir) = self.scene.ray_through(0.0, 0.0)?;
        let pick = self
            .meshes
            .iter()
            .enumerate()
            .filter_map(|(index, mesh)| {
                mesh.try_intersect(&origin, &dir, 0.0).map(|distance| Pick {
                    index,
                    kind: mesh.kind(),
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        match &pick {
            Some(p) => log::info!("Picked {} #{} at distance {}", p.kind, p.index, p.distance),
            None => log::debug!("Pick ray missed every mesh"),
        }
        pick
    }

    /// Draw every mesh into the frame buffer; `now` is seconds since start
    pub fn render_frame(&mut self, now: f64) {
        self.renderer.clear();
        for mesh in &mut self.meshes {
            mesh.draw(&mut self.renderer, &self.scene, now);
        }
    }

    fn present(&self) -> io::Result<()> {
        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!("orbview | FPS: {:.1} | {} | {}", self.fps, HELP, self.status)),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Plane with an orbiting sphere, shown when no model is given
pub fn demo_scene(policy: HitPolicy) -> Vec<Mesh> {
    vec![
        Mesh::plane(Vector2::new(300.0, 300.0), Texture::placeholder(), policy),
        Mesh::sphere(32, 16, Vector3::new(20.0, 20.0, 20.0), Texture::placeholder()),
    ]
}

/// Human-readable summary of a load, one line per file
pub fn describe_report(report: &LoadReport) -> String {
    let mut out = String::new();
    for model in &report.models {
        let triangles: usize = model.meshes.iter().map(|m| m.geometry().triangle_count()).sum();
        let _ = writeln!(
            out,
            "{}: {} meshes, {} triangles",
            model.path.display(),
            model.meshes.len(),
            triangles
        );
        for mesh in &model.meshes {
            let material = mesh.material();
            let name = if material.name.is_empty() { "(default)" } else { material.name.as_str() };
            let texture = match (&material.diffuse_texture, mesh.texture().is_placeholder()) {
                (Some(path), false) => path.display().to_string(),
                (Some(_), true) => "missing".to_string(),
                (None, _) => "none".to_string(),
            };
            let _ = writeln!(
                out,
                "  {}: {} vertices, {} triangles, texture {}",
                name,
                mesh.geometry().vertex_count(),
                mesh.geometry().triangle_count(),
                texture
            );
        }
    }
    for failure in &report.failures {
        let _ = writeln!(out, "failed: {}", failure);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbview_core::{load_models, LoadOptions};
    use tempfile::TempDir;

    fn demo_app() -> TerminalApp {
        TerminalApp::with_size(
            demo_scene(HitPolicy::Closest),
            None,
            &AppConfig::default(),
            80,
            24,
        )
    }

    #[test]
    fn test_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = demo_app();
            app.handle_key(code);
            assert!(!app.is_running());
        }
    }

    #[test]
    fn test_orbit_keys_set_rates() {
        let mut app = demo_app();
        app.handle_key(KeyCode::Char('a'));
        app.handle_key(KeyCode::Char('w'));
        assert_eq!(app.scene().orbit.pan_rate, -PI);
        assert_eq!(app.scene().orbit.tilt_rate, FRAC_PI_2);

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('s'));
        assert_eq!(app.scene().orbit.pan_rate, PI);
        assert_eq!(app.scene().orbit.tilt_rate, -FRAC_PI_2);

        app.update(0.5);
        assert!((app.scene().orbit.pan - FRAC_PI_2).abs() < 1e-6);

        app.handle_key(KeyCode::Char(' '));
        let pan = app.scene().orbit.pan;
        app.update(1.0);
        assert_eq!(app.scene().orbit.pan, pan);
    }

    #[test]
    fn test_toggles() {
        let mut app = demo_app();
        app.handle_key(KeyCode::Char('l'));
        assert!(app.renderer().wireframe());
        assert_eq!(app.status(), "wireframe");

        app.handle_key(KeyCode::Char('i'));
        assert!((app.scene().light.ambient - 0.2).abs() < 1e-6);
        assert_eq!(app.status(), "ambient 0.2");
    }

    #[test]
    fn test_pick_hits_demo_plane() {
        let mut app = demo_app();
        let pick = app.pick().unwrap();
        assert_eq!(pick.index, 0);
        assert_eq!(pick.kind, MeshKind::Plane);
        // the ray starts on the near plane, one unit in front of the eye
        assert!((pick.distance - 499.0).abs() < 0.5);

        app.handle_key(KeyCode::Char('p'));
        assert!(app.status().starts_with("picked plane #0"));
    }

    #[test]
    fn test_pick_with_nothing_to_hit() {
        let mut app = TerminalApp::with_size(Vec::new(), None, &AppConfig::default(), 80, 24);
        assert!(app.pick().is_none());
        app.handle_key(KeyCode::Char('p'));
        assert_eq!(app.status(), "nothing under the cursor");
    }

    #[test]
    fn test_render_frame_draws_demo() {
        let mut app = demo_app();
        app.render_frame(0.0);
        assert!(app.renderer().covered() > 0);
    }

    #[test]
    fn test_resize_event() {
        let mut app = demo_app();
        app.handle_event(Event::Resize(40, 10));
        assert_eq!(app.scene().viewport(), (40, 10));
        assert!(app.renderer().cell(39, 9).is_some());
        assert!(app.renderer().cell(40, 9).is_none());
    }

    #[test]
    fn test_describe_report() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tri.obj"),
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();
        let paths = [dir.path().join("tri.obj"), dir.path().join("gone.obj")];
        let report = load_models(&paths, &LoadOptions::default());

        let text = describe_report(&report);
        assert!(text.contains("tri.obj: 1 meshes, 1 triangles"));
        assert!(text.contains("(default): 3 vertices, 1 triangles, texture none"));
        assert!(text.contains("failed: "));
        assert!(text.contains("gone.obj"));
    }

    #[test]
    fn test_describe_report_shows_single_pixel_texture() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tri.obj"),
            "mtllib tri.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl dot\nf 1 2 3\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("tri.mtl"), "newmtl dot\nmap_Kd dot.ppm\n").unwrap();
        let mut dot = b"P6\n1 1\n255\n".to_vec();
        dot.extend_from_slice(&[10, 20, 30]);
        std::fs::write(dir.path().join("dot.ppm"), dot).unwrap();

        let report = load_models(&[dir.path().join("tri.obj")], &LoadOptions::default());
        let text = describe_report(&report);
        assert!(text.contains("dot.ppm"), "{}", text);
        assert!(!text.contains("missing"), "{}", text);
    }
}
