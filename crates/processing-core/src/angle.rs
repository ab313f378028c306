//! Three-point joint angle.

use sportcv_pose_model::frame::PoseFrame;
use sportcv_pose_model::joint::JointTriplet;

/// Interior angle at `vertex` formed by the segments to `proximal` and `distal`.
///
/// Computed as the absolute difference of the two segment headings
/// (`atan2`), reflected into `[0, 180]` degrees.
pub fn interior_angle_degrees(proximal: (f64, f64), vertex: (f64, f64), distal: (f64, f64)) -> f64 {
    let heading_distal = (distal.1 - vertex.1).atan2(distal.0 - vertex.0);
    let heading_proximal = (proximal.1 - vertex.1).atan2(proximal.0 - vertex.0);

    let angle = (heading_distal - heading_proximal).to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Angle for `triplet` in `frame`, or `None` if any of the three joints is absent.
pub fn joint_angle(frame: &PoseFrame, triplet: &JointTriplet, min_confidence: f64) -> Option<f64> {
    let proximal = frame.present(triplet.proximal, min_confidence)?;
    let vertex = frame.present(triplet.vertex, min_confidence)?;
    let distal = frame.present(triplet.distal, min_confidence)?;

    Some(interior_angle_degrees(
        proximal.position(),
        vertex.position(),
        distal.position(),
    ))
}
