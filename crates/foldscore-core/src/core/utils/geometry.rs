use nalgebra::{Point3, Rotation3, Unit, Vector3};

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

/// Rotates `point` by `angle_degrees` about the line through `origin` along `axis`
/// (right-hand rule).
pub fn rotate_about_axis(
    point: &Point3<f64>,
    origin: &Point3<f64>,
    axis: &Vector3<f64>,
    angle_degrees: f64,
) -> Point3<f64> {
    let rotation = rotation_from_axis_angle(axis, angle_degrees);
    origin + rotation * (point - origin)
}

/// Wraps an angle in degrees into `[-180, 180)`.
pub fn wrap_angle(angle_degrees: f64) -> f64 {
    (angle_degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Dihedral angle a-b-c-d in degrees, IUPAC sign convention, in `(-180, 180]`.
///
/// Returns `None` when three consecutive points are collinear and the angle is
/// undefined.
pub fn dihedral(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Option<f64> {
    let b1 = b - a;
    let b2 = c - b;
    let b3 = d - c;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    if n1.norm_squared() < 1e-12 || n2.norm_squared() < 1e-12 {
        return None;
    }

    let y = b2.norm() * b1.dot(&n2);
    let x = n1.dot(&n2);
    Some(y.atan2(x).to_degrees())
}

/// Angle a-b-c at vertex `b`, in degrees.
pub fn bond_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let denom = ba.norm() * bc.norm();
    if denom < 1e-12 {
        return 0.0;
    }
    (ba.dot(&bc) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Places a fourth atom from three reference atoms and internal coordinates
/// (natural extension reference frame).
///
/// The new atom `d` satisfies `|cd| = bond_length`, `angle(b, c, d) = angle_degrees`
/// and `dihedral(a, b, c, d) = torsion_degrees`.
pub fn place_atom(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    bond_length: f64,
    angle_degrees: f64,
    torsion_degrees: f64,
) -> Point3<f64> {
    let bc = (c - b).normalize();
    let n = (b - a).cross(&bc).normalize();
    let m = n.cross(&bc);

    let angle = angle_degrees.to_radians();
    let torsion = torsion_degrees.to_radians();
    let local = Vector3::new(
        -bond_length * angle.cos(),
        bond_length * angle.sin() * torsion.cos(),
        bond_length * angle.sin() * torsion.sin(),
    );

    c + bc * local.x + m * local.y + n * local.z
}
