use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Vertical relation of a target to the viewer.
///
/// `Above` means the target stands more than the threshold higher than the
/// viewer; `Below` the mirror case. Every fire-mode rule reads it this way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeightBand {
    Below,
    Level,
    Above,
}

pub fn height_band(from: &Location, to: &Location, threshold: f64) -> HeightBand {
    let dz = to.z - from.z;
    if dz > threshold {
        HeightBand::Above
    } else if dz < -threshold {
        HeightBand::Below
    } else {
        HeightBand::Level
    }
}

/// Point `reach` units away from `origin` along a horizontal heading in degrees.
pub fn focus_from_yaw(origin: &Location, yaw_degrees: f64, reach: f64) -> Location {
    let rad = yaw_degrees.to_radians();
    Location::new(
        origin.x + rad.cos() * reach,
        origin.y + rad.sin() * reach,
        origin.z,
    )
}

/// Index of the point closest to `target`, first one wins on ties.
pub fn nearest(points: &[Location], target: &Location) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        let d = p.distance(target);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}
