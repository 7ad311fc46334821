//! Fire-control gate for autonomous pilots.

/// Largest steering error (either side) at which a pilot will shoot.
pub const MAX_FIRE_STEERING_ERROR: f32 = 0.1;
/// Squared engagement range.
pub const MAX_FIRE_DISTANCE_SQUARED: f32 = 4.0e7;

/// Whether a pilot with this steering error and squared target distance
/// should pull the trigger.
pub fn can_fire(steering_error: f32, distance_squared: f32, has_target: bool) -> bool {
    has_target
        && steering_error.abs() <= MAX_FIRE_STEERING_ERROR
        && distance_squared < MAX_FIRE_DISTANCE_SQUARED
}
