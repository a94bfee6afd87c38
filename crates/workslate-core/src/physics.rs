//! Gravity simulation bridge.
//!
//! [`PhysicsController`] maps the current slide's objects onto bodies in a
//! [`PhysicsWorld`], steps it once per frame and writes positions and angles onto
//! the same objects.

use crate::document::{ObjectIndex, Slide};
use crate::shapes::{Drawable, ShapeTrait};
use crate::task::FrameTask;
use kurbo::{Point, Size};
use rapier2d::na::Point2;
use rapier2d::prelude::*;

/// Simulation step per frame, in milliseconds.
pub const FRAME_STEP_MS: f64 = 16.666;

/// Thickness of the floor and side walls.
pub const WALL_THICKNESS: f64 = 200.0;

/// Minimum stroke segment length that becomes a collider.
pub const MIN_SEGMENT_LENGTH: f64 = 5.0;

/// Minimum collider thickness for lines and strokes.
pub const MIN_BAR_THICKNESS: f64 = 10.0;

/// Downward acceleration in px/s².
pub const GRAVITY: f64 = 1000.0;

pub type BodyHandle = usize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Box { width: f64, height: f64 },
    Circle { radius: f64 },
    Polygon { radius: f64, sides: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Point,
    pub angle: f64,
    pub shape: BodyShape,
    pub is_static: bool,
    pub restitution: f64,
    pub friction: f64,
}

impl BodyDesc {
    pub fn dynamic(position: Point, shape: BodyShape) -> Self {
        Self {
            position,
            angle: 0.0,
            shape,
            is_static: false,
            restitution: 0.3,
            friction: 0.1,
        }
    }

    /// Immovable box, used for walls, lines and stroke segments.
    pub fn fixed(position: Point, width: f64, height: f64, angle: f64) -> Self {
        Self {
            position,
            angle,
            shape: BodyShape::Box { width, height },
            is_static: true,
            restitution: 0.5,
            friction: 0.0,
        }
    }

    fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    fn with_material(mut self, restitution: f64, friction: f64) -> Self {
        self.restitution = restitution;
        self.friction = friction;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Point,
    pub angle: f64,
    pub is_static: bool,
}

/// A rigid-body simulation.
pub trait PhysicsWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Advance the simulation by `dt_ms` milliseconds.
    fn step(&mut self, dt_ms: f64);

    fn body(&self, handle: BodyHandle) -> Option<BodyState>;

    fn body_count(&self) -> usize;

    fn clear(&mut self);
}

/// [`PhysicsWorld`] backed by rapier, in canvas pixels with y pointing down.
pub struct RapierWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    handles: Vec<RigidBodyHandle>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        let mut params = IntegrationParameters::default();
        // Typical object size in pixels; scales rapier's tolerances.
        params.length_unit = 100.0;
        Self {
            gravity: vector![0.0, GRAVITY as Real],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            handles: Vec::new(),
        }
    }
}

fn collider_for(shape: BodyShape) -> ColliderBuilder {
    match shape {
        BodyShape::Box { width, height } => ColliderBuilder::cuboid((width / 2.0) as Real, (height / 2.0) as Real),
        BodyShape::Circle { radius } => ColliderBuilder::ball(radius as Real),
        BodyShape::Polygon { radius, sides } => {
            let step = std::f64::consts::TAU / sides.max(3) as f64;
            let vertices: Vec<Point2<Real>> = (0..sides.max(3))
                .map(|i| {
                    let (sin, cos) = (i as f64 * step - std::f64::consts::FRAC_PI_2).sin_cos();
                    point![(radius * cos) as Real, (radius * sin) as Real]
                })
                .collect();
            ColliderBuilder::convex_hull(&vertices).unwrap_or_else(|| ColliderBuilder::ball(radius as Real))
        }
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let builder = if desc.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let body = builder
            .translation(vector![desc.position.x as Real, desc.position.y as Real])
            .rotation(desc.angle as Real)
            .build();
        let handle = self.bodies.insert(body);
        let collider = collider_for(desc.shape)
            .restitution(desc.restitution as Real)
            .friction(desc.friction as Real)
            .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        self.handles.push(handle);
        self.handles.len() - 1
    }

    fn step(&mut self, dt_ms: f64) {
        self.params.dt = (dt_ms / 1000.0) as Real;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    fn body(&self, handle: BodyHandle) -> Option<BodyState> {
        let body = self.bodies.get(*self.handles.get(handle)?)?;
        let position = body.translation();
        Some(BodyState {
            position: Point::new(position.x as f64, position.y as f64),
            angle: body.rotation().angle() as f64,
            is_static: body.is_fixed(),
        })
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Dynamic body for an object, if it takes part in the simulation as a
/// falling body.
fn dynamic_body(object: &Drawable) -> Option<BodyDesc> {
    let rotation = object.rotation();
    match object {
        Drawable::Rect(r) => Some(box_body(r.x, r.y, r.w, r.h, rotation)),
        Drawable::Image(img) => Some(box_body(img.x, img.y, img.w, img.h, rotation)),
        Drawable::Circle(c) => {
            let radius = if c.radius > 0.0 { c.radius } else { 20.0 };
            Some(
                BodyDesc::dynamic(Point::new(c.x, c.y), BodyShape::Circle { radius })
                    .with_material(0.7, 0.001),
            )
        }
        Drawable::Poly(p) => {
            let radius = if p.radius > 0.0 { p.radius } else { 20.0 };
            Some(
                BodyDesc::dynamic(Point::new(p.x, p.y), BodyShape::Polygon { radius, sides: p.sides })
                    .with_angle(rotation)
                    .with_material(0.3, 0.01),
            )
        }
        _ => None,
    }
}

fn box_body(x: f64, y: f64, w: f64, h: f64, rotation: f64) -> BodyDesc {
    let w = if w != 0.0 { w.abs() } else { 10.0 };
    let h = if h != 0.0 { h.abs() } else { 10.0 };
    BodyDesc::dynamic(Point::new(x + w / 2.0, y + h / 2.0), BodyShape::Box { width: w, height: h })
        .with_angle(rotation)
        .with_material(0.3, 0.1)
}

/// Static colliders for lines and stroke segments.
fn static_bodies(object: &Drawable) -> Vec<BodyDesc> {
    let rotation = object.rotation();
    match object {
        Drawable::Line(line) => {
            let delta = line.end() - line.start();
            let center = line.start().midpoint(line.end());
            let thickness = line.width.max(MIN_BAR_THICKNESS);
            vec![BodyDesc::fixed(center, delta.hypot(), thickness, delta.atan2() + rotation)]
        }
        Drawable::Path(path) if path.points.len() > 1 => {
            let pivot = path.bounds().center();
            let thickness = path.width.max(MIN_BAR_THICKNESS);
            path.points
                .windows(2)
                .filter_map(|pair| {
                    let delta = pair[1] - pair[0];
                    let dist = delta.hypot();
                    if dist < MIN_SEGMENT_LENGTH {
                        return None;
                    }
                    let mut center = pair[0].midpoint(pair[1]);
                    if rotation != 0.0 {
                        center = crate::geometry::rotate_about(center, pivot, rotation);
                    }
                    Some(
                        BodyDesc::fixed(center, dist + 2.0, thickness, delta.atan2() + rotation)
                            .with_material(0.0, 0.0),
                    )
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Floor below the canvas and walls either side of it.
fn boundary_walls(canvas: Size) -> [BodyDesc; 3] {
    let (w, h, t) = (canvas.width, canvas.height, WALL_THICKNESS);
    [
        BodyDesc::fixed(Point::new(w / 2.0, h + t / 2.0), w * 5.0, t, 0.0).with_material(0.0, 1.0),
        BodyDesc::fixed(Point::new(-t / 2.0, h / 2.0), t, h * 5.0, 0.0).with_material(0.0, 0.0),
        BodyDesc::fixed(Point::new(w + t / 2.0, h / 2.0), t, h * 5.0, 0.0).with_material(0.0, 0.0),
    ]
}

/// Runs a physics simulation over the current slide's objects.
pub struct PhysicsController {
    world: Box<dyn PhysicsWorld>,
    bodies: Vec<(BodyHandle, ObjectIndex)>,
    task: Option<FrameTask>,
}

impl Default for PhysicsController {
    fn default() -> Self {
        Self::new(Box::new(RapierWorld::default()))
    }
}

impl PhysicsController {
    pub fn new(world: Box<dyn PhysicsWorld>) -> Self {
        Self {
            world,
            bodies: Vec::new(),
            task: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(FrameTask::is_alive)
    }

    /// Number of objects driven by the simulation.
    pub fn mapped_objects(&self) -> usize {
        self.bodies.len()
    }

    /// Build the world from `slide`. Returns `false` if already running.
    pub fn start(&mut self, slide: &Slide, canvas: Size) -> bool {
        if self.is_active() {
            return false;
        }
        self.world.clear();
        self.bodies.clear();

        for (index, object) in slide.iter().enumerate() {
            if let Some(desc) = dynamic_body(object) {
                let handle = self.world.add_body(desc);
                self.bodies.push((handle, index));
            } else {
                for desc in static_bodies(object) {
                    self.world.add_body(desc);
                }
            }
        }
        for wall in boundary_walls(canvas) {
            self.world.add_body(wall);
        }

        log::info!(
            "Physics started: {} dynamic of {} bodies",
            self.bodies.len(),
            self.world.body_count()
        );
        self.task = Some(FrameTask::new("physics"));
        true
    }

    /// Step the world once and write body state back onto `slide`.
    /// Returns whether the simulation is still running.
    pub fn sync_frame(&mut self, slide: &mut Slide) -> bool {
        let Some(task) = self.task.as_mut() else {
            return false;
        };
        let world = &mut self.world;
        let bodies = &self.bodies;
        task.tick(|| {
            world.step(FRAME_STEP_MS);
            for &(handle, index) in bodies {
                let (Some(state), Some(object)) = (world.body(handle), slide.get_mut(index)) else {
                    continue;
                };
                if state.is_static {
                    continue;
                }
                apply_body_state(object, state);
            }
        })
    }

    /// Stop the simulation. Returns `true` only when it was running, so the
    /// caller commits history exactly once.
    pub fn stop(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        let was_running = task.cancel();
        self.world.clear();
        self.bodies.clear();
        if was_running {
            log::info!("Physics stopped after {} frames", task.frames());
        }
        was_running
    }
}

fn apply_body_state(object: &mut Drawable, state: BodyState) {
    object.attrs_mut().rotation = state.angle;
    match object {
        Drawable::Rect(r) => {
            r.x = state.position.x - r.w / 2.0;
            r.y = state.position.y - r.h / 2.0;
        }
        Drawable::Image(img) => {
            img.x = state.position.x - img.w / 2.0;
            img.y = state.position.y - img.h / 2.0;
        }
        Drawable::Circle(c) => {
            c.x = state.position.x;
            c.y = state.position.y;
        }
        Drawable::Poly(p) => {
            p.x = state.position.x;
            p.y = state.position.y;
        }
        _ => {}
    }
}
