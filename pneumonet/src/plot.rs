//! Plot rendering for evaluation artifacts.
//!
//! Charts are drawn directly into `image` RGB buffers: a 2x2 confusion
//! matrix heat-map, ROC and precision-recall curves, and the headline
//! metrics bar chart. Numeric annotations use a small built-in digit
//! bitmap; the full numbers always live in `metrics.json` and the text
//! report, the plots are for visual inspection.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::PneumoNetResult;
use crate::metrics::{ConfusionMatrix, MetricsReport, PrCurve, RocCurve};

/// Canvas width in pixels for every generated plot.
pub const PLOT_WIDTH: u32 = 800;
/// Canvas height in pixels for every generated plot.
pub const PLOT_HEIGHT: u32 = 600;

const MARGIN: u32 = 60;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([220, 220, 220]);
const ORANGE: Rgb<u8> = Rgb([255, 140, 0]);
const NAVY: Rgb<u8> = Rgb([0, 0, 128]);
const BLUE: Rgb<u8> = Rgb([52, 152, 219]);
const GREEN: Rgb<u8> = Rgb([46, 204, 113]);
const RED: Rgb<u8> = Rgb([231, 76, 60]);
const AMBER: Rgb<u8> = Rgb([243, 156, 18]);
const HEAT: Rgb<u8> = Rgb([31, 119, 180]);

/// Rectangular data-to-pixel mapping for a plot.
struct PlotArea {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
    x_max: f64,
    y_max: f64,
}

impl PlotArea {
    fn unit(y_max: f64) -> Self {
        Self {
            left: MARGIN as i64,
            top: MARGIN as i64,
            right: (PLOT_WIDTH - MARGIN) as i64,
            bottom: (PLOT_HEIGHT - MARGIN) as i64,
            x_max: 1.0,
            y_max,
        }
    }

    fn to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let px = self.left as f64 + (x / self.x_max) * (self.right - self.left) as f64;
        let py = self.bottom as f64 - (y / self.y_max) * (self.bottom - self.top) as f64;
        (px.round() as i64, py.round() as i64)
    }
}

fn put_pixel_checked(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    for y in y0.min(y1)..=y0.max(y1) {
        for x in x0.min(x1)..=x0.max(x1) {
            put_pixel_checked(img, x, y, color);
        }
    }
}

/// Bresenham line between two pixel coordinates.
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_checked(img, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_polyline(img: &mut RgbImage, area: &PlotArea, points: &[(f64, f64)], color: Rgb<u8>) {
    for pair in points.windows(2) {
        let a = area.to_pixel(pair[0].0, pair[0].1);
        let b = area.to_pixel(pair[1].0, pair[1].1);
        draw_line(img, a, b, color);
        // Second pass one pixel lower for a 2px stroke.
        draw_line(img, (a.0, a.1 + 1), (b.0, b.1 + 1), color);
    }
}

fn draw_axes(img: &mut RgbImage, area: &PlotArea) {
    // Gridlines at quarter steps of the data range.
    for step in 1..4 {
        let frac = step as f64 / 4.0;
        let (gx, _) = area.to_pixel(frac * area.x_max, 0.0);
        let (_, gy) = area.to_pixel(0.0, frac * area.y_max);
        draw_line(img, (gx, area.top), (gx, area.bottom), GRID);
        draw_line(img, (area.left, gy), (area.right, gy), GRID);
    }
    // Axis box on top of the grid.
    draw_line(img, (area.left, area.top), (area.right, area.top), BLACK);
    draw_line(img, (area.left, area.bottom), (area.right, area.bottom), BLACK);
    draw_line(img, (area.left, area.top), (area.left, area.bottom), BLACK);
    draw_line(img, (area.right, area.top), (area.right, area.bottom), BLACK);
}

// 5x7 bitmaps for the characters the annotations need. Each byte is one
// row, low five bits used.
const GLYPH_ROWS: usize = 7;
const GLYPH_COLS: i64 = 5;

fn glyph(c: char) -> Option<[u8; GLYPH_ROWS]> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        _ => return None,
    };
    Some(rows)
}

/// Stamp a numeric string centered at (cx, cy).
fn stamp_number(img: &mut RgbImage, cx: i64, cy: i64, text: &str, color: Rgb<u8>, scale: i64) {
    let advance = (GLYPH_COLS + 1) * scale;
    let width = advance * text.chars().count() as i64;
    let height = GLYPH_ROWS as i64 * scale;
    let mut x = cx - width / 2;
    let y0 = cy - height / 2;

    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_COLS {
                    if bits >> (GLYPH_COLS - 1 - col) & 1 == 1 {
                        fill_rect(
                            img,
                            x + col * scale,
                            y0 + row as i64 * scale,
                            x + (col + 1) * scale - 1,
                            y0 + (row as i64 + 1) * scale - 1,
                            color,
                        );
                    }
                }
            }
        }
        x += advance;
    }
}

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * t).round() as u8
}

fn heat_color(t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    Rgb([
        lerp_channel(255, HEAT[0], t),
        lerp_channel(255, HEAT[1], t),
        lerp_channel(255, HEAT[2], t),
    ])
}

/// Render the 2x2 confusion-matrix heat-map.
///
/// Rows are true labels (Normal on top), columns predicted labels; cell
/// shading scales with the count and the count itself is stamped in the
/// cell center.
pub fn confusion_matrix_plot(cm: &ConfusionMatrix, path: &Path) -> PneumoNetResult<()> {
    let mut img = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, WHITE);
    let area = PlotArea::unit(1.0);

    let cells = [[cm.tn, cm.fp], [cm.fn_, cm.tp]];
    let max_count = cells.iter().flatten().copied().max().unwrap_or(0).max(1);

    let cell_w = (area.right - area.left) / 2;
    let cell_h = (area.bottom - area.top) / 2;
    for (row, counts) in cells.iter().enumerate() {
        for (col, &count) in counts.iter().enumerate() {
            let x0 = area.left + col as i64 * cell_w;
            let y0 = area.top + row as i64 * cell_h;
            let intensity = count as f64 / max_count as f64;
            fill_rect(&mut img, x0, y0, x0 + cell_w - 1, y0 + cell_h - 1, heat_color(intensity));

            // Dark cells get light digits.
            let text_color = if intensity > 0.6 { WHITE } else { BLACK };
            stamp_number(
                &mut img,
                x0 + cell_w / 2,
                y0 + cell_h / 2,
                &count.to_string(),
                text_color,
                3,
            );
        }
    }

    // Cell borders.
    for i in 0..=2 {
        let x = area.left + i * cell_w;
        let y = area.top + i * cell_h;
        draw_line(&mut img, (x, area.top), (x, area.top + 2 * cell_h), BLACK);
        draw_line(&mut img, (area.left, y), (area.left + 2 * cell_w, y), BLACK);
    }

    img.save(path)?;
    Ok(())
}

/// Render the ROC curve with the diagonal no-skill baseline.
///
/// An undefined curve (single-class input) renders the axes and baseline
/// only.
pub fn roc_curve_plot(curve: Option<&RocCurve>, path: &Path) -> PneumoNetResult<()> {
    let mut img = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, WHITE);
    let area = PlotArea::unit(1.0);
    draw_axes(&mut img, &area);

    // Dashed diagonal from (0,0) to (1,1).
    const DASHES: i64 = 20;
    for d in (0..DASHES).step_by(2) {
        let t0 = d as f64 / DASHES as f64;
        let t1 = (d + 1) as f64 / DASHES as f64;
        let a = area.to_pixel(t0, t0);
        let b = area.to_pixel(t1, t1);
        draw_line(&mut img, a, b, NAVY);
    }

    if let Some(curve) = curve {
        let points: Vec<(f64, f64)> = curve.points.iter().map(|p| (p.fpr, p.tpr)).collect();
        draw_polyline(&mut img, &area, &points, ORANGE);
    }

    img.save(path)?;
    Ok(())
}

/// Render the precision-recall curve.
pub fn pr_curve_plot(curve: Option<&PrCurve>, path: &Path) -> PneumoNetResult<()> {
    let mut img = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, WHITE);
    let area = PlotArea::unit(1.0);
    draw_axes(&mut img, &area);

    if let Some(curve) = curve {
        let points: Vec<(f64, f64)> = curve
            .points
            .iter()
            .map(|p| (p.recall, p.precision))
            .collect();
        draw_polyline(&mut img, &area, &points, BLUE);
    }

    img.save(path)?;
    Ok(())
}

/// Render the bar chart of the four headline metrics, each bar annotated
/// with its value to three decimals.
pub fn metrics_bar_chart(report: &MetricsReport, path: &Path) -> PneumoNetResult<()> {
    let mut img = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, WHITE);
    // Headroom above 1.0 so full bars do not touch the frame.
    let area = PlotArea::unit(1.1);
    draw_axes(&mut img, &area);

    let bars = [
        (report.accuracy, BLUE),
        (report.precision, GREEN),
        (report.recall, RED),
        (report.f1_score, AMBER),
    ];

    let span = area.right - area.left;
    let slot = span / bars.len() as i64;
    let bar_w = slot * 3 / 5;
    for (i, &(value, color)) in bars.iter().enumerate() {
        let x0 = area.left + i as i64 * slot + (slot - bar_w) / 2;
        let (_, y_top) = area.to_pixel(0.0, value.clamp(0.0, 1.0));
        fill_rect(&mut img, x0, y_top, x0 + bar_w, area.bottom - 1, color);
        stamp_number(
            &mut img,
            x0 + bar_w / 2,
            y_top - 14,
            &format!("{value:.3}"),
            BLACK,
            2,
        );
    }

    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{pr_curve, roc_curve, MetricsReport};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("pneumonet-plot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn confusion_matrix_plot_writes_png() {
        let cm = ConfusionMatrix {
            tn: 40,
            fp: 10,
            fn_: 5,
            tp: 45,
        };
        let path = temp_path("cm.png");
        confusion_matrix_plot(&cm, &path).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), PLOT_WIDTH);
        assert_eq!(img.height(), PLOT_HEIGHT);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn curve_plots_handle_defined_and_undefined() {
        let probs = [0.9, 0.7, 0.5, 0.3];
        let labels = [1, 0, 1, 0];
        let roc = roc_curve(&probs, &labels);
        let pr = pr_curve(&probs, &labels);

        let roc_path = temp_path("roc.png");
        let pr_path = temp_path("pr.png");
        roc_curve_plot(roc.as_ref(), &roc_path).unwrap();
        pr_curve_plot(pr.as_ref(), &pr_path).unwrap();
        // Undefined curves still produce a canvas.
        let empty_path = temp_path("roc_empty.png");
        roc_curve_plot(None, &empty_path).unwrap();

        for path in [&roc_path, &pr_path, &empty_path] {
            let img = image::open(path).unwrap();
            assert_eq!(img.width(), PLOT_WIDTH);
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn bar_chart_writes_png() {
        let report = MetricsReport::compute(&[1, 0, 1, 0], &[1, 0, 0, 0], &[0.9, 0.1, 0.4, 0.2])
            .unwrap();
        let path = temp_path("bars.png");
        metrics_bar_chart(&report, &path).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!(img.height(), PLOT_HEIGHT);
        let _ = std::fs::remove_file(&path);
    }
}
