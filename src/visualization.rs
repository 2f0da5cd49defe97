//! Visualization utilities for tours.
//!
//! Renders a point set and an optional tour either as a character map for the
//! terminal or as SVG, and exports plain data for external plotting.

use crate::instance::{Instance, Point};
use crate::solution::Solution;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Character-grid rendering of points and tour edges
#[derive(Debug, Clone)]
pub struct AsciiMap {
    pub width: usize,
    pub height: usize,
}

impl Default for AsciiMap {
    fn default() -> Self {
        AsciiMap { width: 70, height: 40 }
    }
}

impl AsciiMap {
    pub fn new(width: usize, height: usize) -> Self {
        AsciiMap { width, height }
    }

    /// Draw every point as `C_<index>` at its coordinates, then join
    /// consecutive tour points (and the last back to the first) with `*`.
    /// Labels take precedence over edges; anything off the grid is clipped.
    pub fn render(&self, points: &[Point], tour: Option<&[usize]>) -> String {
        let mut grid = vec![vec![' '; self.height]; self.width];

        for (i, p) in points.iter().enumerate() {
            for (j, c) in format!("C_{}", i).chars().enumerate() {
                self.plot(&mut grid, p.x as i64 + j as i64, p.y as i64, c, true);
            }
        }

        if let Some(tour) = tour {
            for (k, &from) in tour.iter().enumerate() {
                let to = tour[(k + 1) % tour.len()];
                self.draw_line(&mut grid, points[from], points[to]);
            }
        }

        let mut out = String::with_capacity(11 + (self.width + 1) * self.height);
        out.push_str("----------\n");
        for y in 0..self.height {
            for column in &grid {
                out.push(column[y]);
            }
            out.push('\n');
        }
        out
    }

    fn draw_line(&self, grid: &mut [Vec<char>], a: Point, b: Point) {
        let (ax, ay) = (a.x as i64, a.y as i64);
        let (dx, dy) = (b.x as i64 - ax, b.y as i64 - ay);
        let steps = dx.abs().max(dy.abs());
        if steps == 0 {
            return;
        }

        // The longer axis advances exactly one cell per step, so only the
        // steps that keep it on the grid can draw anything.
        let (origin, delta, extent) = if dx.abs() >= dy.abs() {
            (ax, dx, self.width as i64)
        } else {
            (ay, dy, self.height as i64)
        };
        let (first, last) = if delta > 0 {
            (-origin, extent - 1 - origin)
        } else {
            (origin - (extent - 1), origin)
        };

        for i in first.max(1)..=last.min(steps) {
            let x = ax + (i as i128 * dx as i128 / steps as i128) as i64;
            let y = ay + (i as i128 * dy as i128 / steps as i128) as i64;
            self.plot(grid, x, y, '*', false);
        }
    }

    fn plot(&self, grid: &mut [Vec<char>], x: i64, y: i64, c: char, overwrite: bool) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let cell = &mut grid[x as usize][y as usize];
        if overwrite || *cell == ' ' {
            *cell = c;
        }
    }
}

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 8.0,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG visualization of a solution
    pub fn generate_svg(&self, instance: &Instance, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = instance.bounds();
        let (min_x, max_x, min_y, max_y) = (min_x as f64, max_x as f64, min_y as f64, max_y as f64);

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #3498db; stroke: #2c3e50; stroke-width: 2; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 2; }}
    .edge {{ stroke: #34495e; stroke-width: 2; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
<defs>
<marker id="arrow" markerWidth="10" markerHeight="10" refX="9" refY="3" orient="auto" markerUnits="strokeWidth">
<path d="M0,0 L0,6 L9,3 z" fill="#34495e"/>
</marker>
</defs>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | Length: {:.2} | {}</text>
"##,
            self.margin, instance.name, solution.cost, solution.algorithm
        ));

        let transform = |p: &Point| -> (f64, f64) {
            let tx = self.margin + (p.x as f64 - min_x) * scale;
            let ty = self.height - self.margin - (p.y as f64 - min_y) * scale;
            (tx, ty)
        };

        if solution.tour.len() > 1 {
            for i in 0..solution.tour.len() {
                let from = solution.tour[i];
                let to = solution.tour[(i + 1) % solution.tour.len()];

                let (x1, y1) = transform(&instance.points[from]);
                let (x2, y2) = transform(&instance.points[to]);

                svg.push_str(&format!(
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge" marker-end="url(#arrow)"/>
"#,
                    x1, y1, x2, y2
                ));
            }
        }

        for (id, point) in instance.points.iter().enumerate() {
            let (x, y) = transform(point);
            let class = if id == 0 { "start" } else { "node" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            svg.push_str(&format!(
                r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                x,
                y - self.node_radius - 3.0,
                id
            ));
        }

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Export data for external plotting (e.g., matplotlib)
    pub fn export_plot_data(&self, instance: &Instance, solution: &Solution) -> String {
        let mut data = String::new();

        data.push_str("# Tour Data\n");
        data.push_str(&format!("# Instance: {}\n", instance.name));
        data.push_str(&format!("# Length: {:.6}\n\n", solution.cost));

        data.push_str("# Points: id, x, y\n");
        for (id, p) in instance.points.iter().enumerate() {
            data.push_str(&format!("{},{},{}\n", id, p.x, p.y));
        }

        data.push_str("\n# Tour: sequence of point ids\n");
        let tour_str: Vec<String> = solution.tour.iter().map(|n| n.to_string()).collect();
        data.push_str(&tour_str.join(","));
        data.push('\n');

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_instance() -> Instance {
        Instance::new("test", vec![Point::new(0, 0), Point::new(10, 0), Point::new(0, 5)])
    }

    #[test]
    fn test_visualizer() {
        let instance = create_test_instance();
        let solution = Solution { tour: vec![0, 1, 2], cost: 26.18, algorithm: "test".into(), ..Solution::new() };

        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &solution);

        assert!(svg.contains("svg"));
        assert!(svg.contains("test"));
        assert_eq!(svg.matches("<line").count(), 3);
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn test_ascii_labels() {
        let map = AsciiMap::new(20, 6);
        let out = map.render(&create_test_instance().points, None);
        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(rows[0], "----------");
        assert_eq!(rows.len(), 7);
        assert!(rows[1].starts_with("C_0"));
        assert_eq!(&rows[1][10..13], "C_1");
        assert!(rows[6].starts_with("C_2"));
        assert!(!out.contains('*'));
    }

    #[test]
    fn test_ascii_route_edges() {
        let map = AsciiMap::new(20, 6);
        let points = vec![Point::new(0, 0), Point::new(10, 0)];
        let out = map.render(&points, Some(&[0, 1]));
        let first_row = out.lines().nth(1).unwrap();
        // labels stay, the gap between them is filled with the edge
        assert_eq!(&first_row[..13], "C_0*******C_1");
    }

    #[test]
    fn test_ascii_clips_out_of_range() {
        let map = AsciiMap::new(5, 3);
        let points = vec![Point::new(-4, 1), Point::new(30, 50), Point::new(3, 2)];
        let out = map.render(&points, Some(&[0, 1, 2]));
        assert_eq!(out.lines().count(), 4);
        assert!(out.lines().skip(1).all(|l| l.chars().count() == 5));
    }

    #[test]
    fn test_ascii_extreme_coordinates() {
        let map = AsciiMap::new(10, 3);

        let points = vec![Point::new(-2_000_000_000, 0), Point::new(2_000_000_000, 0)];
        let out = map.render(&points, Some(&[0, 1]));
        assert_eq!(out.lines().nth(1).unwrap(), "**********");

        let points = vec![Point::new(i32::MIN, i32::MIN), Point::new(i32::MAX, i32::MAX)];
        let out = map.render(&points, Some(&[0, 1]));
        let rows: Vec<Vec<char>> = out.lines().skip(1).map(|l| l.chars().collect()).collect();
        for k in 0..3 {
            assert_eq!(rows[k][k], '*');
        }
    }

    #[test]
    fn test_ascii_label_at_coordinate_limit() {
        let map = AsciiMap::new(8, 2);
        let points = vec![Point::new(i32::MAX, 0), Point::new(i32::MAX, i32::MAX), Point::new(0, 1)];
        let out = map.render(&points, Some(&[0, 1, 2]));
        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[2].starts_with("C_2"));
    }

    #[test]
    fn test_export_plot_data() {
        let instance = create_test_instance();
        let solution = Solution { tour: vec![0, 2, 1], ..Solution::new() };
        let data = Visualizer::new().export_plot_data(&instance, &solution);
        assert!(data.contains("1,10,0"));
        assert!(data.ends_with("0,2,1\n"));
    }
}
