/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    pub number: u64,
    /// Seconds since the loop started
    pub time: f32,
    /// Seconds since the previous frame
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }

    /// Instantaneous rate; zero on the first frame
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 {
            1.0 / self.delta
        } else {
            0.0
        }
    }
}
