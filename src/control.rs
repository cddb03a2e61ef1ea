//! Velocity control fallback
//!
//! The control law itself lives outside this crate. This module only wraps a
//! configured [`VelocitySetpointController`] so that a missing or failing
//! controller yields a zero command instead of an error in the control loop.

use tracing::warn;

use crate::{Result, TrackError};

/// A planar velocity command (robot coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Velocity2D {
    /// Forward velocity (m/s)
    pub x: f64,
    /// Sideways velocity (m/s)
    pub y: f64,
    /// Rotational velocity (rad/s)
    pub phi: f64,
}

impl Velocity2D {
    /// Creates a command.
    pub const fn new(x: f64, y: f64, phi: f64) -> Self {
        Self { x, y, phi }
    }

    /// The zero command.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Inputs handed to the controller each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlInput {
    /// Time of this cycle
    pub timestamp: f64,
    /// Requested velocity
    pub setpoint: Velocity2D,
    /// Command sent in the previous cycle
    pub previous_velocity: Velocity2D,
    /// Time of the previous cycle
    pub previous_timestamp: f64,
}

/// A velocity-setpoint control law.
pub trait VelocitySetpointController {
    /// Computes the velocity command for this cycle.
    fn calculate(&mut self, input: &ControlInput) -> Result<Velocity2D>;
}

/// Runs a controller, remembering the last command sent.
#[derive(Debug, Clone)]
pub struct VelocityControl<C> {
    controller: Option<C>,
    previous_velocity: Velocity2D,
    previous_timestamp: f64,
}

impl<C: VelocitySetpointController> VelocityControl<C> {
    /// Creates a wrapper around an optional controller.
    pub fn new(controller: Option<C>) -> Self {
        Self {
            controller,
            previous_velocity: Velocity2D::zero(),
            previous_timestamp: 0.0,
        }
    }

    /// Replaces the controller.
    pub fn set_controller(&mut self, controller: Option<C>) {
        self.controller = controller;
    }

    /// Computes and records this cycle's command.
    ///
    /// Without a controller, or when the controller fails, the command is
    /// zero.
    pub fn execute(&mut self, timestamp: f64, setpoint: Velocity2D) -> Velocity2D {
        let input = ControlInput {
            timestamp,
            setpoint,
            previous_velocity: self.previous_velocity,
            previous_timestamp: self.previous_timestamp,
        };

        let result = match self.controller.as_mut() {
            Some(controller) => controller.calculate(&input),
            None => Err(TrackError::ControllerUnavailable),
        };
        let velocity = result.unwrap_or_else(|err| {
            warn!("Velocity controller: {}, commanding zero velocity", err);
            Velocity2D::zero()
        });

        self.previous_velocity = velocity;
        self.previous_timestamp = timestamp;
        velocity
    }

    /// Command sent in the last cycle.
    #[inline]
    pub fn previous_velocity(&self) -> Velocity2D {
        self.previous_velocity
    }

    /// Time of the last cycle.
    #[inline]
    pub fn previous_timestamp(&self) -> f64 {
        self.previous_timestamp
    }
}
