/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Vector2, Vector3};
use orbview_core::{Mesh, RenderTarget, Scene, Triangle};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const WIRE_CHAR: char = '#';

/// One character cell of the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub character: char,
    pub color: Color,
}

impl Cell {
    const BLANK: Cell = Cell {
        character: ' ',
        color: Color::Reset,
    };
}

/// Screen-space vertex: column, row and NDC depth
type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that converts meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    wireframe: bool,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![Cell::BLANK; size],
            wireframe: false,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            wireframe: self.wireframe,
            ..Self::new(width, height)
        };
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(Cell::BLANK);
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Number of cells with something drawn in them
    pub fn covered(&self) -> usize {
        self.cells.iter().filter(|c| c.character != ' ').count()
    }

    fn render_triangle(&mut self, mesh: &Mesh, scene: &Scene, face: [usize; 3]) {
        let geometry = mesh.geometry();
        let world_from_model = mesh.world_from_model();

        // Project vertices to screen space
        let mut screen = [(0.0, 0.0, 0.0); 3];
        for (slot, &i) in screen.iter_mut().zip(&face) {
            match scene.project(&geometry.positions[i], world_from_model) {
                Some(p) => *slot = p,
                None => return, // Triangle is clipped
            }
        }

        if self.wireframe {
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                self.draw_line(screen[a], screen[b]);
            }
            return;
        }

        let world = Triangle::new(
            world_from_model.transform_point(&geometry.positions[face[0]]),
            world_from_model.transform_point(&geometry.positions[face[1]]),
            world_from_model.transform_point(&geometry.positions[face[2]]),
        );
        let uv = face
            .iter()
            .fold(Vector2::zeros(), |acc, &i| acc + geometry.uvs[i])
            / 3.0;
        let Some(cell) = shade(mesh, scene, &world, &uv) else {
            return;
        };

        self.rasterize_triangle(&screen, cell);
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenPoint; 3], cell: Cell) {
        let [v0, v1, v2] = *coords;

        // Bounding box, clipped to the screen
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p)
                else {
                    continue;
                };
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                    self.plot(x, y, depth, cell);
                }
            }
        }
    }

    /// DDA line between two projected points, depth tested
    fn draw_line(&mut self, a: ScreenPoint, b: ScreenPoint) {
        let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0);
        // keep off-screen edges from stalling the frame
        if !steps.is_finite() || steps > 4.0 * (self.width + self.height) as f32 {
            return;
        }
        let cell = Cell {
            character: WIRE_CHAR,
            color: Color::White,
        };
        for step in 0..=steps as i32 {
            let t = step as f32 / steps;
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            let depth = a.2 + (b.2 - a.2) * t;
            self.plot(x.floor() as i32, y.floor() as i32, depth, cell);
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, cell: Cell) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.cells[idx] = cell;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                writer.queue(SetForegroundColor(cell.color))?;
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderTarget for AsciiRenderer {
    fn draw_mesh(&mut self, mesh: &Mesh, scene: &Scene) {
        for face in mesh.geometry().faces() {
            self.render_triangle(mesh, scene, face);
        }
    }
}

/// Phong shading of one face, lit from both sides. `None` for a degenerate
/// triangle.
fn shade(mesh: &Mesh, scene: &Scene, world: &Triangle, uv: &Vector2<f32>) -> Option<Cell> {
    let centroid = world.centroid();
    let eye = scene.eye();
    let to_eye = (eye - centroid).try_normalize(f32::EPSILON)?;

    let mut normal = world.calculate_normal()?;
    if normal.dot(&to_eye) < 0.0 {
        normal = -normal;
    }

    let light = scene.light.direction.try_normalize(f32::EPSILON)?;
    let lambert = normal.dot(&light).max(0.0);
    let reflected = 2.0 * normal.dot(&light) * normal - light;
    let material = mesh.material();
    let highlight = reflected.dot(&to_eye).max(0.0).powf(material.shininess);

    let [r, g, b] = mesh.texture().sample(uv);
    let texel = Vector3::new(r as f32, g as f32, b as f32) / 255.0;

    let color = (material.ambient * scene.light.ambient + material.diffuse * lambert).component_mul(&texel)
        + material.specular * highlight;
    let color = color.map(|c| c.clamp(0.0, 1.0));

    Some(Cell {
        character: ramp(luminance(&color)),
        color: Color::Rgb {
            r: (color.x * 255.0) as u8,
            g: (color.y * 255.0) as u8,
            b: (color.z * 255.0) as u8,
        },
    })
}

fn luminance(color: &Vector3<f32>) -> f32 {
    0.2126 * color.x + 0.7152 * color.y + 0.0722 * color.z
}

/// Map brightness to character; anything lit gets at least the dimmest mark
fn ramp(brightness: f32) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = ((brightness * last as f32) as usize).clamp(1, last);
    LUMINOSITY_RAMP[index]
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
