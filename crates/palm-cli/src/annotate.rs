//! Draw each observation's box, in its label color, onto a copy of the image.

use anyhow::{Context, Result};
use image::Rgb;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use palm_analyze::Analysis;
use std::path::{Path, PathBuf};

/// Writes `<out_dir>/<stem>_annotated.png` and returns its path.
pub fn save_annotated(image_path: &Path, analysis: &Analysis, out_dir: &Path, line_width: u32) -> Result<PathBuf> {
    let mut img = image::open(image_path)
        .with_context(|| format!("Failed to open image {:?}", image_path))?
        .to_rgb8();
    let (w, h) = (img.width() as i32, img.height() as i32);

    for obs in analysis.observations() {
        let r = obs.bounding_box.to_display_rect(w as f64, h as f64);
        let x_min = (r.x.round() as i32).clamp(0, w);
        let y_min = (r.y.round() as i32).clamp(0, h);
        let x_max = ((r.x + r.width).round() as i32).clamp(0, w);
        let y_max = ((r.y + r.height).round() as i32).clamp(0, h);
        let rw = (x_max - x_min).max(1) as u32;
        let rh = (y_max - y_min).max(1) as u32;
        let color = Rgb(obs.color().rgb());

        // thicken inward, one pixel per pass
        let passes = (line_width.max(1)).min(rw.div_ceil(2)).min(rh.div_ceil(2));
        for t in 0..passes {
            let inner = Rect::at(x_min + t as i32, y_min + t as i32)
                .of_size(rw - 2 * t, rh - 2 * t);
            draw_hollow_rect_mut(&mut img, inner, color);
        }
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;
    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let out = out_dir.join(format!("{stem}_annotated.png"));
    img.save(&out)
        .with_context(|| format!("Failed to write {:?}", out))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use palm_analyze::{BoundingBox, Color, Observation};

    #[test]
    fn draws_box_edges_in_label_color() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("plot.png");
        image::RgbImage::new(100, 50).save(&src).unwrap();

        let analysis = Analysis::new(vec![Observation::new(
            "ganoderma",
            0.9,
            BoundingBox::new(0.1, 0.2, 0.5, 0.4),
        )]);
        let out = save_annotated(&src, &analysis, &dir.path().join("out"), 2).unwrap();
        assert_eq!(out.file_name().unwrap(), "plot_annotated.png");

        let img = image::open(&out).unwrap().to_rgb8();
        let red = Rgb(Color::Red.rgb());
        // top-left corner of the box, and one pixel inside for the second pass
        assert_eq!(*img.get_pixel(10, 10), red);
        assert_eq!(*img.get_pixel(11, 11), red);
        // centre of the box is untouched
        assert_eq!(*img.get_pixel(35, 20), Rgb([0, 0, 0]));
    }

    #[test]
    fn missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_annotated(&dir.path().join("nope.png"), &Analysis::default(), dir.path(), 1);
        assert!(err.is_err());
    }
}
