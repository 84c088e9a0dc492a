use crate::math::SeededRandom;

/// Grid of heights in `[0, 1]`, sampled bilinearly.
///
/// Stands in for the grayscale displacement maps terrain planes use.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightfield {
    cols: usize,
    rows: usize,
    values: Vec<f32>,
}

impl Heightfield {
    pub fn flat(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(2),
            rows: rows.max(2),
            values: vec![0.0; cols.max(2) * rows.max(2)],
        }
    }

    /// Smoothed value noise: a few octaves of random lattices, normalized to `[0, 1]`
    pub fn generate(cols: usize, rows: usize, seed: u32) -> Self {
        let mut field = Self::flat(cols, rows);
        let mut rng = SeededRandom::new(seed);

        let mut amplitude = 1.0;
        for octave in 0..4u32 {
            let cells = 4usize << octave;
            let lattice: Vec<f32> = (0..(cells + 1) * (cells + 1)).map(|_| rng.next_f32()).collect();
            let coarse = Heightfield {
                cols: cells + 1,
                rows: cells + 1,
                values: lattice,
            };
            for r in 0..field.rows {
                for c in 0..field.cols {
                    let u = c as f32 / (field.cols - 1) as f32;
                    let v = r as f32 / (field.rows - 1) as f32;
                    field.values[r * field.cols + c] += coarse.sample(u, v) * amplitude;
                }
            }
            amplitude *= 0.5;
        }

        let (lo, hi) = field
            .values
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let span = (hi - lo).max(f32::EPSILON);
        for v in &mut field.values {
            *v = (*v - lo) / span;
        }
        field
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Bilinear sample; `u` and `v` are clamped to `[0, 1]`
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let x = u.clamp(0.0, 1.0) * (self.cols - 1) as f32;
        let y = v.clamp(0.0, 1.0) * (self.rows - 1) as f32;
        let (x0, y0) = (x.floor() as usize, y.floor() as usize);
        let (x1, y1) = ((x0 + 1).min(self.cols - 1), (y0 + 1).min(self.rows - 1));
        let (fx, fy) = (x - x0 as f32, y - y0 as f32);

        let at = |c: usize, r: usize| self.values[r * self.cols + c];
        let top = at(x0, y0) + (at(x1, y0) - at(x0, y0)) * fx;
        let bottom = at(x0, y1) + (at(x1, y1) - at(x0, y1)) * fx;
        top + (bottom - top) * fy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_values_are_normalized() {
        let field = Heightfield::generate(32, 32, 7);
        let mut lo = f32::MAX;
        let mut hi = f32::MIN;
        for r in 0..32 {
            for c in 0..32 {
                let v = field.sample(c as f32 / 31.0, r as f32 / 31.0);
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        assert!(lo >= 0.0 && hi <= 1.0);
        assert!(hi - lo > 0.5);
    }

    #[test]
    fn same_seed_same_terrain() {
        assert_eq!(Heightfield::generate(16, 16, 3), Heightfield::generate(16, 16, 3));
    }

    #[test]
    fn sample_clamps_outside_unit_square() {
        let field = Heightfield::generate(8, 8, 1);
        assert_eq!(field.sample(-1.0, -1.0), field.sample(0.0, 0.0));
        assert_eq!(field.sample(2.0, 2.0), field.sample(1.0, 1.0));
    }
}
