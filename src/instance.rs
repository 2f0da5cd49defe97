//! Module for loading, generating and describing point sets.
//!
//! Instances are stored in a compact binary layout: a 4-byte little-endian
//! signed count `n`, followed by `n` pairs of 4-byte little-endian signed
//! integers `(x, y)`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// A location on the integer grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An ordered set of points; index 0 is the start of every tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Name of the instance (file stem when loaded from disk)
    pub name: String,
    /// Points in file order
    pub points: Vec<Point>,
}

impl Instance {
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Instance { name: name.into(), points }
    }

    /// Number of points
    pub fn dimension(&self) -> usize {
        self.points.len()
    }

    /// Load an instance from a binary point file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut instance = Self::from_reader(BufReader::new(file))?;
        instance.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        log::debug!("loaded {} points from {}", instance.dimension(), path.display());
        Ok(instance)
    }

    /// Parse the binary layout from any reader.
    ///
    /// A missing or negative count, or fewer coordinate pairs than announced,
    /// is reported as `InvalidInput`.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let count = read_i32(&mut reader)
            .map_err(|_| SolverError::invalid_input("missing point count"))?;
        if count < 0 {
            return Err(SolverError::invalid_input(format!(
                "negative point count {}",
                count
            )));
        }
        let count = count as usize;

        // The count is untrusted, so grow the vector as pairs actually arrive.
        let mut points = Vec::with_capacity(count.min(1024));
        for i in 0..count {
            let x = read_i32(&mut reader).map_err(|_| truncated(count, i))?;
            let y = read_i32(&mut reader).map_err(|_| truncated(count, i))?;
            points.push(Point::new(x, y));
        }

        Ok(Instance::new(String::new(), points))
    }

    /// Serialize into the binary layout
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let count = i32::try_from(self.points.len()).map_err(|_| {
            SolverError::invalid_input(format!("{} points do not fit the count field", self.points.len()))
        })?;
        writer.write_all(&count.to_le_bytes())?;
        for p in &self.points {
            writer.write_all(&p.x.to_le_bytes())?;
            writer.write_all(&p.y.to_le_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the instance to a binary point file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Generate `n` random points with `0 <= x < width`, `0 <= y < height`.
    /// Deterministic via seed.
    pub fn random(n: usize, seed: u64, width: i32, height: i32) -> Self {
        use rand::prelude::*;
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = (0..n)
            .map(|_| Point::new(rng.gen_range(0..width.max(1)), rng.gen_range(0..height.max(1))))
            .collect();

        Instance::new(format!("random-n{}-s{}", n, seed), points)
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let n = self.points.len();
        let mut distances = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in i + 1..n {
                distances.push(self.points[i].distance_to(&self.points[j]));
            }
        }

        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let min_distance = distances.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);

        let bounds = self.bounds();

        InstanceStatistics {
            name: self.name.clone(),
            dimension: n,
            min_x: bounds.0,
            max_x: bounds.1,
            min_y: bounds.2,
            max_y: bounds.3,
            avg_distance,
            min_distance: if min_distance.is_finite() { min_distance } else { 0.0 },
            max_distance,
            dp_states: dp_state_count(n),
        }
    }

    /// (min_x, max_x, min_y, max_y), all zero for an empty instance
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        if self.points.is_empty() {
            return (0, 0, 0, 0);
        }
        self.points.iter().fold(
            (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
            |(min_x, max_x, min_y, max_y), p| {
                (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
            },
        )
    }
}

fn read_i32<R: Read>(reader: &mut R) -> std::io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn truncated(expected: usize, read: usize) -> SolverError {
    SolverError::invalid_input(format!(
        "expected {} points but the data ends after {}",
        expected, read
    ))
}

/// Number of (mask, endpoint) cells of the subset DP for `n` points, if it fits.
pub fn dp_state_count(n: usize) -> Option<u128> {
    if n == 0 || n > 64 {
        return None;
    }
    Some((n as u128) << (n - 1))
}

/// Statistics about an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub dp_states: Option<u128>,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Points: {} (1 start + {} to visit)", self.dimension, self.dimension.saturating_sub(1))?;
        writeln!(f, "  Bounds: x in [{}, {}], y in [{}, {}]", self.min_x, self.max_x, self.min_y, self.max_y)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)?;
        match self.dp_states {
            Some(states) => writeln!(f, "  DP states: {}", states),
            None => writeln!(f, "  DP states: out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(words: &[i32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn test_distance_calculation() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((b.distance_to(&a) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_read_points() {
        let bytes = encode(&[3, 0, 0, 10, -5, 7, 8]);
        let instance = Instance::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(
            instance.points,
            vec![Point::new(0, 0), Point::new(10, -5), Point::new(7, 8)]
        );
    }

    #[test]
    fn test_missing_count() {
        let err = Instance::from_reader(Cursor::new(vec![1u8, 0])).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(ref m) if m.contains("count")));
    }

    #[test]
    fn test_negative_count() {
        let err = Instance::from_reader(Cursor::new(encode(&[-2]))).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(_)));
    }

    #[test]
    fn test_truncated_pairs() {
        // three points announced, one and a half present
        let bytes = encode(&[3, 1, 2, 3]);
        let err = Instance::from_reader(Cursor::new(bytes)).unwrap_err();
        match err {
            SolverError::InvalidInput(m) => assert!(m.contains("ends after 1")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_write_layout() {
        let instance = Instance::new("t", vec![Point::new(1, -1), Point::new(2, 3)]);
        let mut buf = Vec::new();
        instance.write_to(&mut buf).unwrap();
        assert_eq!(buf, encode(&[2, 1, -1, 2, 3]));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("held_karp_instance_{}.bin", std::process::id()));
        let instance = Instance::random(6, 7, 60, 40);
        instance.save(&path).unwrap();
        let loaded = Instance::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.points, instance.points);
        assert!(!loaded.name.is_empty());
    }

    #[test]
    fn test_random_is_seeded_and_bounded() {
        let a = Instance::random(10, 42, 64, 40);
        let b = Instance::random(10, 42, 64, 40);
        assert_eq!(a.points, b.points);
        assert!(a.points.iter().all(|p| (0..64).contains(&p.x) && (0..40).contains(&p.y)));
    }

    #[test]
    fn test_statistics() {
        let instance = Instance::new("sq", vec![
            Point::new(0, 0),
            Point::new(0, 10),
            Point::new(10, 10),
            Point::new(10, 0),
        ]);
        let stats = instance.statistics();
        assert_eq!(stats.dimension, 4);
        assert_eq!(stats.dp_states, Some(32));
        assert!((stats.min_distance - 10.0).abs() < 1e-10);
        assert!((stats.max_distance - 200f64.sqrt()).abs() < 1e-10);
        assert_eq!((stats.min_x, stats.max_x), (0, 10));
    }
}
