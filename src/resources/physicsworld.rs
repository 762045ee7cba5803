//! Rigid-body physics world adapter.
//!
//! Wraps a rapier3d pipeline behind the handful of operations the scene
//! needs: create a body, step with a fixed timestep, read a body's state,
//! set its velocity or position, and ray-cast a walk step against the other
//! colliders.
//!
//! Contact properties are resolved per material pair. Every collider carries
//! its [`Material`] in `user_data`, and [`ContactMaterials`] overrides the
//! solver's friction and restitution for each contact from a symmetric pair
//! table.
//!
//! Bodies with mass 0 are created fixed, so the simulation never moves them.

use bevy_ecs::prelude::Resource;
use log::debug;
use nalgebra::{UnitQuaternion, Vector3};
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;

use crate::resources::gameconfig::PhysicsSettings;

pub type BodyHandle = RigidBodyHandle;

/// Surface material of a collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Material {
    /// Floor and boundaries.
    Default,
    Actor,
}

impl Material {
    fn to_user_data(self) -> u128 {
        match self {
            Material::Default => 0,
            Material::Actor => 1,
        }
    }

    fn from_user_data(data: u128) -> Material {
        match data {
            1 => Material::Actor,
            _ => Material::Default,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactProps {
    pub friction: f32,
    pub restitution: f32,
}

/// Symmetric `(a, b) -> ContactProps` table used by the solver hook.
#[derive(Clone, Debug)]
pub struct ContactMaterials {
    pairs: FxHashMap<(Material, Material), ContactProps>,
    fallback: ContactProps,
}

impl ContactMaterials {
    pub fn new(fallback: ContactProps) -> Self {
        Self {
            pairs: FxHashMap::default(),
            fallback,
        }
    }

    fn key(a: Material, b: Material) -> (Material, Material) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn insert(&mut self, a: Material, b: Material, props: ContactProps) {
        self.pairs.insert(Self::key(a, b), props);
    }

    pub fn lookup(&self, a: Material, b: Material) -> ContactProps {
        self.pairs
            .get(&Self::key(a, b))
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl PhysicsHooks for ContactMaterials {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let material = |handle: ColliderHandle| {
            context
                .colliders
                .get(handle)
                .map(|c| Material::from_user_data(c.user_data))
                .unwrap_or(Material::Default)
        };
        let props = self.lookup(material(context.collider1), material(context.collider2));
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = props.friction;
            contact.restitution = props.restitution;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyShape {
    Cuboid { half_extents: Vector3<f32> },
    Ball { radius: f32 },
}

/// Everything needed to create a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    /// 0 creates a fixed body.
    pub mass: f32,
    pub shape: BodyShape,
    pub material: Material,
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub lock_rotations: bool,
}

impl BodyDesc {
    pub fn fixed(shape: BodyShape, position: Vector3<f32>) -> Self {
        Self {
            mass: 0.0,
            shape,
            material: Material::Default,
            position,
            orientation: UnitQuaternion::identity(),
            lock_rotations: false,
        }
    }

    pub fn with_orientation(mut self, orientation: UnitQuaternion<f32>) -> Self {
        self.orientation = orientation;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub linvel: Vector3<f32>,
    pub angvel: Vector3<f32>,
}

/// Orientation from rotations about X, then Y, then Z, composed as
/// `Rx * Ry * Rz` (intrinsic XYZ).
pub fn orientation_from_xyz(x: f32, y: f32, z: f32) -> UnitQuaternion<f32> {
    let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x);
    let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y);
    let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z);
    qx * qy * qz
}

#[derive(Resource)]
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    materials: ContactMaterials,
    fixed_timestep: f32,
    max_substeps: u32,
    accumulator: f32,
    steps_taken: u64,
}

impl PhysicsWorld {
    pub fn new(
        gravity_y: f32,
        fixed_timestep: f32,
        max_substeps: u32,
        materials: ContactMaterials,
    ) -> Self {
        Self {
            gravity: vector![0.0, gravity_y, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            materials,
            fixed_timestep: fixed_timestep.max(1e-4),
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            steps_taken: 0,
        }
    }

    /// World with the default and actor materials registered.
    pub fn from_settings(settings: &PhysicsSettings) -> Self {
        let default_props = ContactProps {
            friction: settings.default_friction,
            restitution: settings.default_restitution,
        };
        let mut materials = ContactMaterials::new(default_props);
        materials.insert(Material::Default, Material::Default, default_props);
        materials.insert(
            Material::Actor,
            Material::Default,
            ContactProps {
                friction: settings.actor_friction,
                restitution: settings.actor_restitution,
            },
        );
        Self::new(
            settings.gravity_y,
            settings.fixed_timestep,
            settings.max_substeps,
            materials,
        )
    }

    pub fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let builder = if desc.mass <= 0.0 {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let mut builder = builder
            .translation(desc.position)
            .rotation(desc.orientation.scaled_axis());
        if desc.lock_rotations {
            builder = builder.lock_rotations();
        }
        let handle = self.rigid_body_set.insert(builder.build());

        let collider = match desc.shape {
            BodyShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            BodyShape::Ball { radius } => ColliderBuilder::ball(radius),
        };
        let mut collider = collider
            .user_data(desc.material.to_user_data())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS);
        if desc.mass > 0.0 {
            collider = collider.mass(desc.mass);
        }
        self.collider_set
            .insert_with_parent(collider.build(), handle, &mut self.rigid_body_set);
        self.query_pipeline.update(&self.collider_set);
        debug!(
            "created {} body {:?} at {:?}",
            if desc.mass <= 0.0 { "fixed" } else { "dynamic" },
            handle,
            desc.position
        );
        handle
    }

    /// Step the simulation once by exactly `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &self.materials,
            &(),
        );
        self.steps_taken += 1;
    }

    /// Consume `frame_dt` of real time in fixed steps.
    ///
    /// Leftover time carries to the next frame. At most `max_substeps` steps
    /// run per call; time beyond that is dropped. Returns the steps taken.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.fixed_timestep && steps < self.max_substeps {
            self.step(self.fixed_timestep);
            self.accumulator -= self.fixed_timestep;
            steps += 1;
        }
        if steps == self.max_substeps {
            self.accumulator = self.accumulator.min(self.fixed_timestep);
        }
        steps
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn body_state(&self, handle: BodyHandle) -> Option<BodyState> {
        self.rigid_body_set.get(handle).map(|body| BodyState {
            position: *body.translation(),
            orientation: *body.rotation(),
            linvel: *body.linvel(),
            angvel: *body.angvel(),
        })
    }

    pub fn is_fixed(&self, handle: BodyHandle) -> bool {
        self.rigid_body_set
            .get(handle)
            .is_some_and(|body| body.is_fixed())
    }

    pub fn set_body_velocity(
        &mut self,
        handle: BodyHandle,
        linvel: Vector3<f32>,
        angvel: Vector3<f32>,
    ) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => {
                body.set_linvel(linvel, true);
                body.set_angvel(angvel, true);
                true
            }
            None => false,
        }
    }

    pub fn zero_velocity(&mut self, handle: BodyHandle) -> bool {
        self.set_body_velocity(handle, Vector3::zeros(), Vector3::zeros())
    }

    /// Clear the vertical component of a body's linear velocity, keeping the
    /// horizontal components and the spin.
    pub fn zero_vertical_velocity(&mut self, handle: BodyHandle) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => {
                let mut linvel = *body.linvel();
                linvel.y = 0.0;
                body.set_linvel(linvel, true);
                true
            }
            None => false,
        }
    }

    pub fn set_body_translation(&mut self, handle: BodyHandle, position: Vector3<f32>) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => {
                body.set_translation(position, true);
                true
            }
            None => false,
        }
    }

    /// How far a body of `radius` centred at `origin` can travel along the
    /// unit `direction` before its surface meets another collider, capped at
    /// `max_dist`. The body's own colliders are ignored.
    pub fn clear_distance(
        &self,
        handle: BodyHandle,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_dist: f32,
        radius: f32,
    ) -> f32 {
        if max_dist <= 0.0 {
            return 0.0;
        }
        let ray = Ray::new(point![origin.x, origin.y, origin.z], direction);
        let filter = QueryFilter::default().exclude_rigid_body(handle);
        match self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_dist + radius,
            true,
            filter,
        ) {
            Some((_, toi)) => (toi - radius).clamp(0.0, max_dist),
            None => max_dist,
        }
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}
