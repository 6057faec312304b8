//! Quadric surfaces: text descriptors, sidedness, distance, normals and
//! transforms.

use std::fmt;

use quadcell_math::{Dir3, Mat3, Point3, Transform, Vec3};

use crate::diagnostics::Diagnostics;
use crate::distance::DistanceSolver;
use crate::error::{GeometryError, ParseError};
use crate::quadric::Quadric;

/// Default half-width of the band around zero in which the implicit value
/// counts as on the surface. Also the default limit for
/// [`Surface::on_surface`].
pub const SIDE_TOLERANCE: f64 = 1e-6;

/// Components below this are treated as zero when choosing a descriptor.
const AXIS_EPS: f64 = 1e-12;

const AXIS_NAMES: [char; 3] = ['x', 'y', 'z'];

// =============================================================================
// Classification
// =============================================================================

/// Which side of a surface a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Implicit value below minus the surface tolerance.
    Inside,
    /// Implicit value within the tolerance band.
    On,
    /// Implicit value above the surface tolerance.
    Outside,
}

impl Side {
    /// `-1` inside, `0` on, `+1` outside.
    pub fn sign(self) -> i32 {
        match self {
            Self::Inside => -1,
            Self::On => 0,
            Self::Outside => 1,
        }
    }
}

/// The kind of a surface (for match-based dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Infinite plane.
    Plane,
    /// Sphere.
    Sphere,
    /// Infinite circular cylinder.
    Cylinder,
    /// Infinite double cone.
    Cone,
    /// Torus (quartic).
    Torus,
    /// Any quadric known only by its coefficients.
    General,
}

/// Semantic parameters of a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// `normal · p = distance`.
    Plane {
        /// Unit normal; points to the outside.
        normal: Dir3,
        /// Signed offset from the origin along the normal.
        distance: f64,
    },
    /// Sphere.
    Sphere {
        /// Centre.
        centre: Point3,
        /// Radius.
        radius: f64,
    },
    /// Cylinder through `centre` along `axis`.
    Cylinder {
        /// Any point on the axis.
        centre: Point3,
        /// Axis direction.
        axis: Dir3,
        /// Radius.
        radius: f64,
    },
    /// Double cone `ρ² = tan2 · h²` about `axis` through `apex`.
    Cone {
        /// Apex.
        apex: Point3,
        /// Axis direction.
        axis: Dir3,
        /// Squared tangent of the half angle.
        tan2: f64,
    },
    /// Torus; its quadric coefficients are unused.
    Torus {
        /// Centre of the ring.
        centre: Point3,
        /// Axis normal to the ring plane.
        axis: Dir3,
        /// Distance from the centre to the tube centre.
        major: f64,
        /// Tube radius.
        minor: f64,
    },
    /// Known only through its coefficients.
    General,
}

impl Shape {
    /// The kind of this shape.
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Self::Plane { .. } => SurfaceKind::Plane,
            Self::Sphere { .. } => SurfaceKind::Sphere,
            Self::Cylinder { .. } => SurfaceKind::Cylinder,
            Self::Cone { .. } => SurfaceKind::Cone,
            Self::Torus { .. } => SurfaceKind::Torus,
            Self::General => SurfaceKind::General,
        }
    }

    /// Coefficients implied by the parameters. `None` for shapes without a
    /// quadric form of their own.
    fn quadric(&self) -> Option<Quadric> {
        match self {
            Self::Plane { normal, distance } => Some(Quadric::plane(normal.as_ref(), *distance)),
            Self::Sphere { centre, radius } => {
                Some(Quadric::from_form(&Mat3::identity(), centre, -radius * radius))
            }
            Self::Cylinder { centre, axis, radius } => {
                let m = Mat3::identity() - outer(axis);
                Some(Quadric::from_form(&m, centre, -radius * radius))
            }
            Self::Cone { apex, axis, tan2 } => {
                let m = Mat3::identity() - (1.0 + tan2) * outer(axis);
                Some(Quadric::from_form(&m, apex, 0.0))
            }
            Self::Torus { .. } | Self::General => None,
        }
    }
}

fn outer(a: &Dir3) -> Mat3 {
    a.as_ref() * a.as_ref().transpose()
}

// =============================================================================
// Surface
// =============================================================================

/// A surface with a fixed integer id.
///
/// The ten coefficients are kept consistent with the semantic parameters and
/// re-derived on every transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    id: i32,
    shape: Shape,
    eqn: Quadric,
    solver: DistanceSolver,
    tolerance: f64,
}

impl Surface {
    fn from_shape(id: i32, shape: Shape) -> Self {
        let eqn = shape.quadric().unwrap_or_else(Quadric::zero);
        Self {
            id,
            shape,
            eqn,
            solver: DistanceSolver::default(),
            tolerance: SIDE_TOLERANCE,
        }
    }

    /// The plane `normal · p = distance`; the normal need not be unit length.
    pub fn plane(id: i32, normal: Vec3, distance: f64) -> Result<Self, GeometryError> {
        let len = normal.norm();
        let normal = unit(id, normal, "plane normal is zero")?;
        Ok(Self::from_shape(
            id,
            Shape::Plane {
                normal,
                distance: distance / len,
            },
        ))
    }

    /// A sphere.
    pub fn sphere(id: i32, centre: Point3, radius: f64) -> Result<Self, GeometryError> {
        positive(id, radius, "radius")?;
        Ok(Self::from_shape(id, Shape::Sphere { centre, radius }))
    }

    /// An infinite cylinder through `centre` along `axis`.
    pub fn cylinder(id: i32, centre: Point3, axis: Vec3, radius: f64) -> Result<Self, GeometryError> {
        positive(id, radius, "radius")?;
        let axis = unit(id, axis, "cylinder axis is zero")?;
        Ok(Self::from_shape(id, Shape::Cylinder { centre, axis, radius }))
    }

    /// A double cone with apex, axis and squared half-angle tangent.
    pub fn cone(id: i32, apex: Point3, axis: Vec3, tan2: f64) -> Result<Self, GeometryError> {
        positive(id, tan2, "tan²")?;
        let axis = unit(id, axis, "cone axis is zero")?;
        Ok(Self::from_shape(id, Shape::Cone { apex, axis, tan2 }))
    }

    /// A ring torus; `minor` must be smaller than `major`.
    pub fn torus(
        id: i32,
        centre: Point3,
        axis: Vec3,
        major: f64,
        minor: f64,
    ) -> Result<Self, GeometryError> {
        positive(id, major, "major radius")?;
        positive(id, minor, "minor radius")?;
        if minor >= major {
            return Err(GeometryError::DegenerateSurface {
                id,
                reason: format!("minor radius {minor} is not below major radius {major}"),
            });
        }
        let axis = unit(id, axis, "torus axis is zero")?;
        Ok(Self::from_shape(
            id,
            Shape::Torus {
                centre,
                axis,
                major,
                minor,
            },
        ))
    }

    /// A surface known only by its coefficients.
    pub fn general(id: i32, eqn: Quadric) -> Result<Self, GeometryError> {
        if eqn.coeffs[..9].iter().all(|c| c.abs() < 1e-14) {
            return Err(GeometryError::DegenerateSurface {
                id,
                reason: "all non-constant coefficients vanish".into(),
            });
        }
        Ok(Self {
            id,
            shape: Shape::General,
            eqn,
            solver: DistanceSolver::default(),
            tolerance: SIDE_TOLERANCE,
        })
    }

    /// Parse `"id tag params..."`.
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        let trimmed = text.trim();
        let (id_token, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));
        let id = id_token.parse::<i32>().map_err(|_| ParseError::NonNumeric {
            token: id_token.to_string(),
            text: text.to_string(),
        })?;
        parse_descriptor(id, rest)
    }

    /// Replace the shape with one parsed from `"tag params..."`, keeping the id.
    pub fn set_from_text(&mut self, descriptor: &str) -> Result<(), ParseError> {
        let parsed = parse_descriptor(self.id, descriptor)?;
        self.shape = parsed.shape;
        self.eqn = parsed.eqn;
        Ok(())
    }

    /// Surface id.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Semantic parameters.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Surface kind.
    pub fn kind(&self) -> SurfaceKind {
        self.shape.kind()
    }

    /// The ten coefficients (all zero for a torus).
    pub fn quadric(&self) -> &Quadric {
        &self.eqn
    }

    /// Solver used for [`Shape::General`] distances.
    pub fn distance_solver(&self) -> DistanceSolver {
        self.solver
    }

    /// Choose the solver used for [`Shape::General`] distances.
    pub fn set_distance_solver(&mut self, solver: DistanceSolver) {
        self.solver = solver;
    }

    /// Band used by [`side`](Self::side) and [`on_surface`](Self::on_surface).
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Set the on-surface band. Non-positive values are ignored.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        if tolerance > 0.0 {
            self.tolerance = tolerance;
        }
    }

    /// Implicit function value; positive outside.
    pub fn value(&self, p: &Point3) -> f64 {
        match &self.shape {
            Shape::Torus {
                centre,
                axis,
                major,
                minor,
            } => {
                let q = p - centre;
                let h = q.dot(axis.as_ref());
                let q2 = q.norm_squared();
                let s = q2 + major * major - minor * minor;
                s * s - 4.0 * major * major * (q2 - h * h)
            }
            _ => self.eqn.eval(p),
        }
    }

    /// Gradient of the implicit function.
    pub fn gradient(&self, p: &Point3) -> Vec3 {
        match &self.shape {
            Shape::Torus {
                centre,
                axis,
                major,
                minor,
            } => {
                let q = p - centre;
                let a = axis.as_ref();
                let h = q.dot(a);
                let s = q.norm_squared() + major * major - minor * minor;
                4.0 * s * q - 8.0 * major * major * (q - h * a)
            }
            _ => self.eqn.gradient(p),
        }
    }

    /// Classify a point against the implicit equation.
    pub fn side(&self, p: &Point3) -> Side {
        let v = self.value(p);
        if v.abs() <= self.tolerance {
            Side::On
        } else if v > 0.0 {
            Side::Outside
        } else {
            Side::Inside
        }
    }

    /// True if the point is within the surface tolerance of the surface.
    pub fn on_surface(&self, p: &Point3) -> bool {
        self.distance(p) <= self.tolerance
    }

    /// Unsigned distance from `p` to the surface.
    pub fn distance(&self, p: &Point3) -> f64 {
        self.distance_with(p, &mut Diagnostics::new())
    }

    /// Like [`distance`](Self::distance), noting solver fallbacks.
    pub fn distance_with(&self, p: &Point3, diagnostics: &mut Diagnostics) -> f64 {
        match &self.shape {
            Shape::Plane { normal, distance } => (normal.dot(&p.coords) - distance).abs(),
            Shape::Sphere { centre, radius } => ((p - centre).norm() - radius).abs(),
            Shape::Cylinder { centre, axis, radius } => {
                let (_, rho) = axial_radial(&(p - centre), axis);
                (rho - radius).abs()
            }
            Shape::Cone { apex, axis, tan2 } => {
                let (h, rho) = axial_radial(&(p - apex), axis);
                let half = tan2.sqrt().atan();
                (rho * half.cos() - h.abs() * half.sin()).abs()
            }
            Shape::Torus {
                centre,
                axis,
                major,
                minor,
            } => {
                let (h, rho) = axial_radial(&(p - centre), axis);
                ((rho - major).hypot(h) - minor).abs()
            }
            Shape::General => self.solver.distance_with(&self.eqn, p, diagnostics),
        }
    }

    /// Unit outward normal at `p`.
    pub fn surface_normal(&self, p: &Point3) -> Result<Dir3, GeometryError> {
        Dir3::try_new(self.gradient(p), 1e-12).ok_or_else(|| GeometryError::DegenerateSurface {
            id: self.id,
            reason: format!("normal vanishes at ({}, {}, {})", p.x, p.y, p.z),
        })
    }

    /// Apply an affine transform.
    ///
    /// A rigid transform keeps the surface type. Any other transform demotes
    /// a quadric to [`Shape::General`] (a plane stays a plane) and is
    /// rejected for a torus.
    pub fn transform(&mut self, t: &Transform) -> Result<(), GeometryError> {
        if t.is_rigid() {
            self.apply_rigid(t);
            return Ok(());
        }
        if matches!(self.shape, Shape::Torus { .. }) {
            return Err(GeometryError::NonRigidTransform { id: self.id });
        }
        let inv = t.inverse().ok_or_else(|| GeometryError::DegenerateSurface {
            id: self.id,
            reason: "singular transform".into(),
        })?;
        let eqn = self.eqn.congruent(&inv.matrix);
        if eqn.is_planar() {
            let plane = Self::plane(self.id, eqn.linear_terms(), -eqn.constant())?;
            self.shape = plane.shape;
            self.eqn = plane.eqn;
        } else {
            self.shape = Shape::General;
            self.eqn = eqn;
        }
        Ok(())
    }

    /// Rotate about the origin by a 3x3 matrix.
    pub fn rotate(&mut self, rotation: &Mat3) -> Result<(), GeometryError> {
        self.transform(&Transform::from_linear(rotation))
    }

    /// Translate by `offset`.
    pub fn displace(&mut self, offset: &Vec3) {
        self.apply_rigid(&Transform::translation_by(offset));
    }

    fn apply_rigid(&mut self, t: &Transform) {
        let r = t.linear_part();
        let turn = |d: &Dir3| Dir3::new_normalize(r * d.as_ref());
        self.shape = match &self.shape {
            Shape::Plane { normal, distance } => {
                let on_plane = t.apply_point(&Point3::from(normal.as_ref() * *distance));
                let normal = turn(normal);
                Shape::Plane {
                    distance: normal.dot(&on_plane.coords),
                    normal,
                }
            }
            Shape::Sphere { centre, radius } => Shape::Sphere {
                centre: t.apply_point(centre),
                radius: *radius,
            },
            Shape::Cylinder { centre, axis, radius } => Shape::Cylinder {
                centre: t.apply_point(centre),
                axis: turn(axis),
                radius: *radius,
            },
            Shape::Cone { apex, axis, tan2 } => Shape::Cone {
                apex: t.apply_point(apex),
                axis: turn(axis),
                tan2: *tan2,
            },
            Shape::Torus {
                centre,
                axis,
                major,
                minor,
            } => Shape::Torus {
                centre: t.apply_point(centre),
                axis: turn(axis),
                major: *major,
                minor: *minor,
            },
            Shape::General => Shape::General,
        };
        if !matches!(self.shape, Shape::Torus { .. }) {
            self.eqn = self.eqn.congruent(&t.rigid_inverse().matrix);
        }
    }

    /// Same id and geometry within `tol`: torus parameters are compared
    /// directly, every other surface by its coefficients.
    pub fn approx_eq(&self, other: &Surface, tol: f64) -> bool {
        if self.id != other.id {
            return false;
        }
        match (&self.shape, &other.shape) {
            (
                Shape::Torus {
                    centre: c1,
                    axis: a1,
                    major: r1,
                    minor: m1,
                },
                Shape::Torus {
                    centre: c2,
                    axis: a2,
                    major: r2,
                    minor: m2,
                },
            ) => {
                (c1 - c2).norm() <= tol
                    && (a1.dot(a2.as_ref()).abs() - 1.0).abs() <= tol
                    && (r1 - r2).abs() <= tol
                    && (m1 - m2).abs() <= tol
            }
            (Shape::Torus { .. }, _) | (_, Shape::Torus { .. }) => false,
            _ => self.eqn.max_difference(&other.eqn) <= tol,
        }
    }
}

fn unit(id: i32, v: Vec3, reason: &str) -> Result<Dir3, GeometryError> {
    Dir3::try_new(v, 1e-12).ok_or_else(|| GeometryError::DegenerateSurface {
        id,
        reason: reason.into(),
    })
}

fn positive(id: i32, value: f64, what: &str) -> Result<(), GeometryError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::DegenerateSurface {
            id,
            reason: format!("{what} must be positive, got {value}"),
        })
    }
}

/// Split `q` into its component along `axis` and its distance from the axis.
fn axial_radial(q: &Vec3, axis: &Dir3) -> (f64, f64) {
    let h = q.dot(axis.as_ref());
    (h, (q - h * axis.as_ref()).norm())
}

// =============================================================================
// Text descriptors
// =============================================================================

fn arity(tag: &str) -> Option<usize> {
    Some(match tag {
        "p" => 4,
        "px" | "py" | "pz" => 1,
        "so" => 1,
        "s" => 4,
        "sx" | "sy" | "sz" => 2,
        "c/x" | "c/y" | "c/z" => 3,
        "cx" | "cy" | "cz" => 1,
        "k/x" | "k/y" | "k/z" => 4,
        "kx" | "ky" | "kz" => 2,
        "gq" | "sq" => 10,
        "t/x" | "t/y" | "t/z" => 5,
        "t/a" => 8,
        _ => return None,
    })
}

fn axis_index(tag: &str) -> usize {
    match tag.chars().last() {
        Some('x') => 0,
        Some('y') => 1,
        _ => 2,
    }
}

fn basis(i: usize) -> Vec3 {
    let mut v = Vec3::zeros();
    v[i] = 1.0;
    v
}

fn parse_descriptor(id: i32, descriptor: &str) -> Result<Surface, ParseError> {
    let mut tokens = descriptor.split_whitespace();
    let raw_tag = tokens.next().ok_or_else(|| ParseError::UnknownTag {
        tag: String::new(),
        text: descriptor.to_string(),
    })?;
    let tag = raw_tag.to_ascii_lowercase();
    let expected = arity(&tag).ok_or_else(|| ParseError::UnknownTag {
        tag: raw_tag.to_string(),
        text: descriptor.to_string(),
    })?;

    let values = tokens
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ParseError::NonNumeric {
                token: token.to_string(),
                text: descriptor.to_string(),
            }),
        })
        .collect::<Result<Vec<f64>, ParseError>>()?;
    if values.len() != expected {
        return Err(ParseError::WrongArity {
            tag: raw_tag.to_string(),
            expected,
            found: values.len(),
            text: descriptor.to_string(),
        });
    }

    build(id, &tag, &values).map_err(|err| ParseError::InvalidParameter {
        tag: raw_tag.to_string(),
        message: match err {
            GeometryError::DegenerateSurface { reason, .. } => reason,
            other => other.to_string(),
        },
    })
}

fn build(id: i32, tag: &str, v: &[f64]) -> Result<Surface, GeometryError> {
    let axis = axis_index(tag);
    let point = |i: usize| Point3::new(v[i], v[i + 1], v[i + 2]);
    let on_axis = |c: f64| Point3::from(basis(axis) * c);
    match tag {
        "p" => Surface::plane(id, Vec3::new(v[0], v[1], v[2]), v[3]),
        "px" | "py" | "pz" => Surface::plane(id, basis(axis), v[0]),
        "so" => Surface::sphere(id, Point3::origin(), v[0]),
        "s" => Surface::sphere(id, point(0), v[3]),
        "sx" | "sy" | "sz" => Surface::sphere(id, on_axis(v[0]), v[1]),
        "c/x" | "c/y" | "c/z" => {
            let (j, k) = transverse(axis);
            let mut centre = Point3::origin();
            centre[j] = v[0];
            centre[k] = v[1];
            Surface::cylinder(id, centre, basis(axis), v[2])
        }
        "cx" | "cy" | "cz" => Surface::cylinder(id, Point3::origin(), basis(axis), v[0]),
        "k/x" | "k/y" | "k/z" => Surface::cone(id, point(0), basis(axis), v[3]),
        "kx" | "ky" | "kz" => Surface::cone(id, on_axis(v[0]), basis(axis), v[1]),
        "gq" => {
            let mut coeffs = [0.0; 10];
            coeffs.copy_from_slice(v);
            Surface::general(id, Quadric::new(coeffs))
        }
        "sq" => Surface::general(id, special_quadric(v)),
        "t/x" | "t/y" | "t/z" => Surface::torus(id, point(0), basis(axis), v[3], v[4]),
        "t/a" => Surface::torus(id, point(0), Vec3::new(v[3], v[4], v[5]), v[6], v[7]),
        _ => Err(GeometryError::DegenerateSurface {
            id,
            reason: format!("no constructor for '{tag}'"),
        }),
    }
}

/// The two axes perpendicular to `axis`, in increasing order.
fn transverse(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

/// Expand `A(x-x̄)² + B(y-ȳ)² + C(z-z̄)² + 2D(x-x̄) + 2E(y-ȳ) + 2F(z-z̄) + G`.
fn special_quadric(v: &[f64]) -> Quadric {
    let (a, b, c, d, e, f, g) = (v[0], v[1], v[2], v[3], v[4], v[5], v[6]);
    let (x, y, z) = (v[7], v[8], v[9]);
    Quadric::new([
        a,
        b,
        c,
        0.0,
        0.0,
        0.0,
        2.0 * d - 2.0 * a * x,
        2.0 * e - 2.0 * b * y,
        2.0 * f - 2.0 * c * z,
        a * x * x + b * y * y + c * z * z - 2.0 * d * x - 2.0 * e * y - 2.0 * f * z + g,
    ])
}

/// Index and sign of the coordinate axis `v` is parallel to, if any.
fn aligned_axis(v: &Vec3) -> Option<(usize, f64)> {
    let i = v.iamax();
    let (j, k) = transverse(i);
    (v[j].abs() < AXIS_EPS && v[k].abs() < AXIS_EPS).then(|| (i, v[i].signum()))
}

fn is_zero(x: f64) -> bool {
    x.abs() < AXIS_EPS
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.id)?;
        match &self.shape {
            Shape::Plane { normal, distance } => match aligned_axis(normal.as_ref()) {
                Some((i, s)) if s > 0.0 => write!(f, "p{} {}", AXIS_NAMES[i], distance),
                _ => write!(f, "p {} {} {} {}", normal.x, normal.y, normal.z, distance),
            },
            Shape::Sphere { centre, radius } => {
                let zeros = centre.iter().filter(|c| is_zero(**c)).count();
                if zeros == 3 {
                    write!(f, "so {radius}")
                } else if zeros == 2 {
                    let i = centre.coords.iamax();
                    write!(f, "s{} {} {}", AXIS_NAMES[i], centre[i], radius)
                } else {
                    write!(f, "s {} {} {} {}", centre.x, centre.y, centre.z, radius)
                }
            }
            Shape::Cylinder { centre, axis, radius } => match aligned_axis(axis.as_ref()) {
                Some((i, _)) => {
                    let (j, k) = transverse(i);
                    if is_zero(centre[j]) && is_zero(centre[k]) {
                        write!(f, "c{} {}", AXIS_NAMES[i], radius)
                    } else {
                        write!(f, "c/{} {} {} {}", AXIS_NAMES[i], centre[j], centre[k], radius)
                    }
                }
                None => write_general(f, &self.eqn),
            },
            Shape::Cone { apex, axis, tan2 } => match aligned_axis(axis.as_ref()) {
                Some((i, _)) => {
                    let (j, k) = transverse(i);
                    if is_zero(apex[j]) && is_zero(apex[k]) {
                        write!(f, "k{} {} {}", AXIS_NAMES[i], apex[i], tan2)
                    } else {
                        write!(f, "k/{} {} {} {} {}", AXIS_NAMES[i], apex.x, apex.y, apex.z, tan2)
                    }
                }
                None => write_general(f, &self.eqn),
            },
            Shape::Torus {
                centre,
                axis,
                major,
                minor,
            } => match aligned_axis(axis.as_ref()) {
                Some((i, _)) => write!(
                    f,
                    "t/{} {} {} {} {} {}",
                    AXIS_NAMES[i], centre.x, centre.y, centre.z, major, minor
                ),
                None => write!(
                    f,
                    "t/a {} {} {} {} {} {} {} {}",
                    centre.x, centre.y, centre.z, axis.x, axis.y, axis.z, major, minor
                ),
            },
            Shape::General => write_general(f, &self.eqn),
        }
    }
}

fn write_general(f: &mut fmt::Formatter<'_>, eqn: &Quadric) -> fmt::Result {
    write!(f, "gq")?;
    for c in &eqn.coeffs {
        write!(f, " {c}")?;
    }
    Ok(())
}
