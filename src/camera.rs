use glam::{Mat4, Vec2, Vec3};
use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

pub const ORBIT_ROTATE_SPEED: f32 = 0.005;
pub const ORBIT_KEY_STEP: f32 = 0.05;
pub const ZOOM_STEP: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Normalized device coordinates of a world point, or `None` when the
    /// point is behind the camera or outside the depth range
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= self.near * 0.5 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        (ndc.z >= 0.0 && ndc.z <= 1.0).then_some(ndc)
    }

    /// Distance from the camera plane, positive in front
    pub fn depth(&self, world: Vec3) -> f32 {
        (world - self.position).dot(self.forward())
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(75.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

/// Rotate and zoom the camera around a target point.
///
/// Holds spherical coordinates relative to `target`; `update` writes them
/// back into the camera each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    /// Fraction of pending rotation applied per update; 1.0 disables damping
    pub damping: f32,
    pub enabled: bool,
    radius: f32,
    polar: f32,
    azimuth: f32,
    pending: Vec2,
    dragging: bool,
    last_cursor: Option<Vec2>,
}

impl OrbitControls {
    /// Start from the camera's current position and target
    pub fn new(camera: &PerspectiveCamera) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length().max(f32::EPSILON);
        Self {
            target: camera.target,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar: 0.0,
            max_polar: std::f32::consts::PI,
            damping: 1.0,
            enabled: true,
            radius,
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
            pending: Vec2::ZERO,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.damping = factor.clamp(0.01, 1.0);
        self
    }

    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self.radius = self.radius.clamp(min, max);
        self
    }

    pub fn with_polar_limits(mut self, min: f32, max: f32) -> Self {
        self.min_polar = min;
        self.max_polar = max;
        self.polar = self.polar.clamp(min, max);
        self
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    /// Queue a rotation in radians (azimuth, polar)
    pub fn rotate(&mut self, azimuth: f32, polar: f32) {
        if self.enabled {
            self.pending += Vec2::new(azimuth, polar);
        }
    }

    /// Scale the distance to the target; < 1 moves closer
    pub fn zoom(&mut self, factor: f32) {
        if self.enabled && factor > 0.0 {
            self.radius = (self.radius * factor).clamp(self.min_distance, self.max_distance);
        }
    }

    /// Move the orbit center, keeping the camera offset
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Re-read the pose after the camera was moved directly. Limits and
    /// damping are kept; queued rotation is dropped.
    pub fn sync(&mut self, camera: &PerspectiveCamera) {
        let fresh = Self::new(camera);
        self.target = fresh.target;
        self.radius = fresh.radius;
        self.polar = fresh.polar;
        self.azimuth = fresh.azimuth;
        self.pending = Vec2::ZERO;
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.last_cursor = None;
    }

    /// Cursor movement in physical pixels; rotates while dragging
    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        let cursor = Vec2::new(x, y);
        if self.dragging {
            if let Some(last) = self.last_cursor {
                let d = (cursor - last) * ORBIT_ROTATE_SPEED;
                self.rotate(-d.x, -d.y);
            }
        }
        self.last_cursor = Some(cursor);
    }

    pub fn process_keyboard(&mut self, event: &KeyEvent) {
        if !event.state.is_pressed() {
            return;
        }
        if let PhysicalKey::Code(keycode) = event.physical_key {
            match keycode {
                KeyCode::ArrowLeft | KeyCode::KeyA => self.rotate(ORBIT_KEY_STEP, 0.0),
                KeyCode::ArrowRight | KeyCode::KeyD => self.rotate(-ORBIT_KEY_STEP, 0.0),
                KeyCode::ArrowUp | KeyCode::KeyW => self.rotate(0.0, -ORBIT_KEY_STEP),
                KeyCode::ArrowDown | KeyCode::KeyS => self.rotate(0.0, ORBIT_KEY_STEP),
                KeyCode::KeyQ => self.zoom(ZOOM_STEP),
                KeyCode::KeyE => self.zoom(1.0 / ZOOM_STEP),
                _ => {}
            }
        }
    }

    /// Apply pending rotation (damped) and write the camera pose
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let step = self.pending * self.damping;
        self.pending -= step;
        if self.pending.length_squared() < 1e-10 {
            self.pending = Vec2::ZERO;
        }

        self.azimuth += step.x;
        self.polar = (self.polar + step.y).clamp(
            self.min_polar.max(1e-4),
            self.max_polar.min(std::f32::consts::PI - 1e-4),
        );
        self.radius = self.radius.clamp(self.min_distance, self.max_distance);

        let sin_polar = self.polar.sin();
        let offset = Vec3::new(
            self.radius * sin_polar * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * sin_polar * self.azimuth.cos(),
        );
        camera.target = self.target;
        camera.position = self.target + offset;
    }
}
