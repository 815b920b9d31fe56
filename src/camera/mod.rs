//! Camera planning
//!
//! Scenes become shots, shots are joined by transitions, and the simulator
//! turns both into continuous per-frame motion.

pub mod shot_planner;
pub mod simulator;
pub mod transform;
pub mod transition_planner;

pub use shot_planner::{SaliencySource, ShotPlan, ShotPlanner, ShotType, ZoomSource};
pub use simulator::{CameraPathSimulator, TimedTransform};
pub use transform::{interpolate, InterpolationMode, TransformKeyframe, TransformValue};
pub use transition_planner::{TransitionPlan, TransitionPlanner, TransitionStyle};
