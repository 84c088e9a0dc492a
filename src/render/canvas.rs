/// 2D drawing operations for canvas. Colors are straight RGBA; alpha below
/// 255 blends over what is already there.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Fill entire canvas with color
    Clear([u8; 4]),

    Pixel { x: i32, y: i32, color: [u8; 4] },

    /// Line from (x1, y1) to (x2, y2)
    Line { x1: i32, y1: i32, x2: i32, y2: i32, color: [u8; 4] },

    FilledCircle { cx: i32, cy: i32, radius: u32, color: [u8; 4] },

    /// Filled triangle with screen-space vertices
    Triangle { points: [[f32; 2]; 3], color: [u8; 4] },
}

/// RGBA pixel buffer with queued draw operations
#[derive(Clone, Debug)]
pub struct Canvas {
    pixels: Vec<u8>,
    operations: Vec<DrawOp>,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; byte_len(width, height)],
            operations: Vec::new(),
            width,
            height,
        }
    }

    /// Queue an operation - builder style
    pub fn draw(mut self, op: DrawOp) -> Self {
        self.operations.push(op);
        self
    }

    pub fn push(&mut self, op: DrawOp) {
        self.operations.push(op);
    }

    pub fn pending(&self) -> usize {
        self.operations.len()
    }

    /// Execute all pending operations in order
    pub fn flush(&mut self) {
        let ops = std::mem::take(&mut self.operations);
        for op in &ops {
            self.execute_op(op);
        }
    }

    /// Builder counterpart of `flush`
    pub fn execute_ops(mut self) -> Self {
        self.flush();
        self
    }

    /// Resize and clear to transparent black; pending operations are dropped
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; byte_len(width, height)];
        self.operations.clear();
    }

    fn execute_op(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Clear(color) => self.clear(*color),
            DrawOp::Pixel { x, y, color } => self.blend_pixel(*x, *y, *color),
            DrawOp::Line { x1, y1, x2, y2, color } => self.draw_line(*x1, *y1, *x2, *y2, *color),
            DrawOp::FilledCircle { cx, cy, radius, color } => {
                self.draw_filled_circle(*cx, *cy, *radius, *color)
            }
            DrawOp::Triangle { points, color } => self.draw_triangle(points, *color),
        }
    }

    fn clear(&mut self, color: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = self.offset(x as u32, y as u32);
        let px = &mut self.pixels[idx..idx + 4];

        if color[3] == 255 {
            px.copy_from_slice(&color);
            return;
        }
        let a = color[3] as f32 / 255.0;
        for c in 0..3 {
            px[c] = (color[c] as f32 * a + px[c] as f32 * (1.0 - a)).round() as u8;
        }
        px[3] = px[3].max(color[3]);
    }

    /// Bresenham's algorithm
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: [u8; 4]) {
        let (mut x, mut y) = (x1, y1);

        let dx = (x2 - x).abs();
        let dy = -(y2 - y).abs();
        let sx = if x < x2 { 1 } else { -1 };
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = dx + dy;

        // bound the walk for lines whose endpoints were projected far off-screen
        let limit = 4 * (self.width + self.height) as i32;
        for _ in 0..=dx.max(-dy).min(limit) {
            self.blend_pixel(x, y, color);

            if x == x2 && y == y2 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_filled_circle(&mut self, cx: i32, cy: i32, radius: u32, color: [u8; 4]) {
        let r = radius as i32;
        let r_sq = r * r;

        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r_sq {
                    self.blend_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Scanline fill over the clipped bounding box, sampling pixel centers
    fn draw_triangle(&mut self, points: &[[f32; 2]; 3], color: [u8; 4]) {
        let [a, b, c] = *points;
        let area = edge(a, b, c);
        if area.abs() < f32::EPSILON {
            return;
        }

        let min_x = a[0].min(b[0]).min(c[0]).floor().max(0.0) as i32;
        let max_x = a[0].max(b[0]).max(c[0]).ceil().min(self.width as f32 - 1.0) as i32;
        let min_y = a[1].min(b[1]).min(c[1]).floor().max(0.0) as i32;
        let max_y = a[1].max(b[1]).max(c[1]).ceil().min(self.height as f32 - 1.0) as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f32 + 0.5, y as f32 + 0.5];
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.offset(x, y);
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// RGBA8 buffer size, computed in `usize` so large canvases do not wrap
pub fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn byte_len_does_not_wrap() {
        assert_eq!(byte_len(70_000, 70_000), 19_600_000_000);
        assert_eq!(byte_len(0, 600), 0);
    }

    #[test]
    fn canvas_creation() {
        let canvas = Canvas::new(100, 100);
        assert_eq!(canvas.dimensions(), (100, 100));
        assert_eq!(canvas.pixels().len(), 100 * 100 * 4);
    }

    #[test]
    fn canvas_clear() {
        let canvas = Canvas::new(10, 10).draw(DrawOp::Clear(RED)).execute_ops();

        assert_eq!(canvas.pixel(0, 0), Some(RED));
        assert_eq!(canvas.pixel(9, 9), Some(RED));
    }

    #[test]
    fn half_alpha_blends() {
        let canvas = Canvas::new(4, 4)
            .draw(DrawOp::Clear([0, 0, 0, 255]))
            .draw(DrawOp::Pixel { x: 1, y: 1, color: [200, 100, 0, 128] })
            .execute_ops();

        let px = canvas.pixel(1, 1).unwrap();
        assert!(px[0] > 95 && px[0] < 105);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn canvas_line() {
        let canvas = Canvas::new(50, 50)
            .draw(DrawOp::Line { x1: 10, y1: 10, x2: 20, y2: 20, color: GREEN })
            .execute_ops();

        assert_eq!(canvas.pixel(10, 10), Some(GREEN));
        assert_eq!(canvas.pixel(15, 15), Some(GREEN));
        assert_eq!(canvas.pixel(20, 20), Some(GREEN));
    }

    #[test]
    fn offscreen_line_is_clipped() {
        let canvas = Canvas::new(10, 10)
            .draw(DrawOp::Line { x1: -1_000_000, y1: 5, x2: 1_000_000, y2: 5, color: RED })
            .execute_ops();
        assert_eq!(canvas.pixels().len(), 400);
    }

    #[test]
    fn canvas_filled_circle() {
        let canvas = Canvas::new(50, 50)
            .draw(DrawOp::FilledCircle { cx: 25, cy: 25, radius: 5, color: GREEN })
            .execute_ops();

        assert_eq!(canvas.pixel(25, 25), Some(GREEN));
        assert_eq!(canvas.pixel(25, 23), Some(GREEN));
        assert_eq!(canvas.pixel(25, 35), Some([0, 0, 0, 0]));
    }

    #[test]
    fn triangle_fills_interior_either_winding() {
        for points in [
            [[0.0, 0.0], [20.0, 0.0], [0.0, 20.0]],
            [[0.0, 0.0], [0.0, 20.0], [20.0, 0.0]],
        ] {
            let canvas = Canvas::new(20, 20)
                .draw(DrawOp::Triangle { points, color: RED })
                .execute_ops();
            assert_eq!(canvas.pixel(2, 2), Some(RED));
            assert_eq!(canvas.pixel(18, 18), Some([0, 0, 0, 0]));
        }
    }

    #[test]
    fn canvas_bounds_checking() {
        let canvas = Canvas::new(10, 10)
            .draw(DrawOp::Pixel { x: 100, y: 100, color: RED })
            .draw(DrawOp::Pixel { x: -1, y: 3, color: RED })
            .execute_ops();

        assert_eq!(canvas.pixels().len(), 10 * 10 * 4);
        assert_eq!(canvas.pixel(100, 100), None);
    }
}
