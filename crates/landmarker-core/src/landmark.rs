//! Landmarks and landmark groups.
//!
//! A group is created for one template and keeps its indices dense and
//! stable for its whole lifetime: only point contents ever change.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{LandmarkerError, Result};

/// A single annotation point. `point == None` means not yet placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub index: usize,
    pub point: Option<Vec3>,
}

impl Landmark {
    pub fn empty(index: usize) -> Self {
        Self { index, point: None }
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_none()
    }
}

/// A named partition of landmark indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub label: String,
    pub mask: Vec<usize>,
}

/// One label of a template: its name and how many landmarks it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLabel {
    pub label: String,
    pub size: usize,
}

/// The layout every landmark group of one kind is created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub labels: Vec<TemplateLabel>,
    #[serde(default)]
    pub connectivity: Vec<[usize; 2]>,
}

impl Template {
    /// A group with every landmark of this template still empty.
    pub fn empty_group(&self) -> Result<LandmarkGroup> {
        let labels: Vec<(&str, usize)> = self
            .labels
            .iter()
            .map(|l| (l.label.as_str(), l.size))
            .collect();
        LandmarkGroup::from_template(&labels, self.connectivity.clone())
    }
}

/// An ordered set of landmarks with display links and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkGroup {
    landmarks: Vec<Landmark>,
    connectivity: Vec<[usize; 2]>,
    labels: Vec<Label>,
    next_available: Option<usize>,
    /// Coordinates per point in landmark JSON, 2 or 3.
    dims: usize,
}

impl LandmarkGroup {
    /// Build an empty group from a template: label names with their sizes.
    ///
    /// Label masks are consecutive index ranges in template order.
    pub fn from_template(labels: &[(&str, usize)], connectivity: Vec<[usize; 2]>) -> Result<Self> {
        let mut start = 0;
        let labels: Vec<Label> = labels
            .iter()
            .map(|(name, size)| {
                let label = Label {
                    label: (*name).to_string(),
                    mask: (start..start + size).collect(),
                };
                start += size;
                label
            })
            .collect();
        Self::new(vec![None; start], connectivity, labels)
    }

    /// Build a group from raw points, validating links and label masks.
    pub fn new(points: Vec<Option<Vec3>>, connectivity: Vec<[usize; 2]>, labels: Vec<Label>) -> Result<Self> {
        let count = points.len();
        for [a, b] in &connectivity {
            if *a >= count || *b >= count {
                return Err(LandmarkerError::MalformedGroup(format!(
                    "link [{a}, {b}] references a landmark outside 0..{count}"
                )));
            }
        }
        for label in &labels {
            if let Some(bad) = label.mask.iter().find(|&&i| i >= count) {
                return Err(LandmarkerError::MalformedGroup(format!(
                    "label '{}' references landmark {bad} outside 0..{count}",
                    label.label
                )));
            }
        }

        Ok(Self {
            landmarks: points
                .into_iter()
                .enumerate()
                .map(|(index, point)| Landmark { index, point })
                .collect(),
            connectivity,
            labels,
            next_available: None,
            dims: 3,
        })
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    pub fn point(&self, index: usize) -> Option<Vec3> {
        self.landmarks.get(index).and_then(|lm| lm.point)
    }

    pub fn connectivity(&self) -> &[[usize; 2]] {
        &self.connectivity
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Coordinates written per point: 2 for groups loaded as `[x, y]`.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Landmarks that have been placed.
    pub fn non_empty(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter().filter(|lm| !lm.is_empty())
    }

    pub fn has_non_empty(&self) -> bool {
        self.non_empty().next().is_some()
    }

    /// Replace the point of one landmark. Out-of-range indices are ignored.
    pub fn set_point(&mut self, index: usize, point: Option<Vec3>) {
        if let Some(lm) = self.landmarks.get_mut(index) {
            lm.point = point;
        }
    }

    /// The landmark a new point will be inserted into.
    ///
    /// An explicitly marked landmark wins while it is still empty; otherwise
    /// the first empty landmark is used.
    pub fn next_available(&self) -> Option<usize> {
        self.next_available
            .filter(|&i| self.landmarks.get(i).is_some_and(Landmark::is_empty))
            .or_else(|| self.landmarks.iter().find(|lm| lm.is_empty()).map(|lm| lm.index))
    }

    pub fn set_next_available(&mut self, index: Option<usize>) {
        self.next_available = index;
    }

    pub fn reset_next_available(&mut self) {
        self.next_available = None;
    }

    /// Parse a group from landmark JSON (version 2 format).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: LandmarkGroupJson = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// Serialise to landmark JSON (version 2 format).
    pub fn to_json(&self) -> LandmarkGroupJson {
        LandmarkGroupJson::from(self)
    }
}

/// Wire form of a landmark group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkGroupJson {
    pub landmarks: PointsJson,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default = "default_version")]
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsJson {
    /// Each point is `[x, y]` or `[x, y, z]`; empty landmarks are all `null`.
    pub points: Vec<Vec<Option<f32>>>,
    #[serde(default)]
    pub connectivity: Vec<[usize; 2]>,
}

fn default_version() -> u32 {
    2
}

impl TryFrom<LandmarkGroupJson> for LandmarkGroup {
    type Error = LandmarkerError;

    fn try_from(raw: LandmarkGroupJson) -> Result<Self> {
        let points = raw
            .landmarks
            .points
            .iter()
            .enumerate()
            .map(|(i, coords)| parse_point(i, coords))
            .collect::<Result<Vec<_>>>()?;
        let planar = !raw.landmarks.points.is_empty() && raw.landmarks.points.iter().all(|coords| coords.len() == 2);
        let mut group = LandmarkGroup::new(points, raw.landmarks.connectivity, raw.labels)?;
        if planar {
            group.dims = 2;
        }
        Ok(group)
    }
}

fn parse_point(index: usize, coords: &[Option<f32>]) -> Result<Option<Vec3>> {
    if !(2..=3).contains(&coords.len()) {
        return Err(LandmarkerError::MalformedGroup(format!(
            "point {index} has {} coordinates",
            coords.len()
        )));
    }
    match (coords[0], coords[1], coords.get(2).copied().flatten()) {
        (Some(x), Some(y), z) => Ok(Some(Vec3::new(x, y, z.unwrap_or(0.0)))),
        (None, None, None) => Ok(None),
        _ => Err(LandmarkerError::MalformedGroup(format!(
            "point {index} is partially null"
        ))),
    }
}

impl From<&LandmarkGroup> for LandmarkGroupJson {
    fn from(group: &LandmarkGroup) -> Self {
        let points = group
            .landmarks
            .iter()
            .map(|lm| match lm.point {
                Some(p) => [Some(p.x), Some(p.y), Some(p.z)][..group.dims].to_vec(),
                None => vec![None; group.dims],
            })
            .collect();
        Self {
            landmarks: PointsJson {
                points,
                connectivity: group.connectivity.clone(),
            },
            labels: group.labels.clone(),
            version: default_version(),
        }
    }
}
