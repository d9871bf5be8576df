//! Integration test: run synthetic chart images through every stage and
//! check the trend line against the traced point set.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use trendline_pipeline::{
    GrayImage, PipelineConfig, PipelineError, Point, PointGraph, TrendResponse, contour, edge, hull,
    summary,
};

/// Dark zigzag band on a white background.
fn zigzag_chart() -> GrayImage {
    GrayImage::from_fn(120, 80, |x, y| {
        let x = i64::from(x);
        let y = i64::from(y);
        let center = match x {
            0..=39 => 70 - x,
            40..=79 => 30 + (x - 40) / 2,
            _ => 50 - (x - 80),
        };
        if (10..110).contains(&x) && (y - center).abs() <= 2 {
            image::Luma([0])
        } else {
            image::Luma([255])
        }
    })
}

fn encode_png(img: &GrayImage) -> Vec<u8> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::L8,
    )
    .unwrap();
    buf
}

/// Twice the signed area of triangle `abc`.
fn cross(a: Point, b: Point, c: Point) -> i64 {
    let (ax, ay) = (i64::from(a.x), i64::from(a.y));
    let (bx, by) = (i64::from(b.x), i64::from(b.y));
    let (cx, cy) = (i64::from(c.x), i64::from(c.y));
    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

#[test]
fn trend_points_are_hull_vertices_of_traced_points() {
    let config = PipelineConfig::default();
    let edges = edge::detect(
        &zigzag_chart(),
        config.canny_low,
        config.canny_high,
        config.blur_sigma,
    );
    let contours = contour::trace(&edges);
    assert!(!contours.is_empty(), "expected contours from zigzag chart");

    let graph = PointGraph::build(&contours);
    let points: Vec<Point> = graph.points().collect();
    let point_set: HashSet<Point> = points.iter().copied().collect();

    let trend = hull::extract(&graph).unwrap();
    assert!(trend.len() >= 3, "zigzag hull should have a real area");
    assert!(trend.windows(2).all(|w| w[0].x <= w[1].x));
    assert!(trend.iter().all(|p| point_set.contains(p)));

    // All traced points lie on or inside the hull polygon. Order the
    // vertices around their centroid to walk the boundary.
    let mut ring = trend.clone();
    #[allow(clippy::cast_precision_loss)]
    let (cx, cy) = {
        let n = ring.len() as f64;
        let sx: f64 = ring.iter().map(|p| f64::from(p.x)).sum();
        let sy: f64 = ring.iter().map(|p| f64::from(p.y)).sum();
        (sx / n, sy / n)
    };
    ring.sort_by(|a, b| {
        let ta = (f64::from(a.y) - cy).atan2(f64::from(a.x) - cx);
        let tb = (f64::from(b.y) - cy).atan2(f64::from(b.x) - cx);
        ta.total_cmp(&tb)
    });
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        assert!(points.iter().all(|&p| cross(a, b, p) >= 0));
    }
}

#[test]
fn staged_run_matches_process() {
    let img = zigzag_chart();
    let config = PipelineConfig::default();

    let edges = edge::detect(&img, config.canny_low, config.canny_high, config.blur_sigma);
    let contours = contour::select(contour::trace(&edges), true, None);
    let graph = PointGraph::build(&contours);
    let trend = hull::extract(&graph).unwrap();
    let staged = summary::summarize(&trend).unwrap();

    let direct = trendline_pipeline::process(&encode_png(&img), &config).unwrap();
    assert_eq!(staged, direct);
}

/// 1-pixel dark polyline on white, falling left to right on screen.
fn thin_line_chart() -> GrayImage {
    GrayImage::from_fn(100, 100, |x, y| {
        if (10..90).contains(&x) && y == 10 + (x - 10) * 7 / 8 {
            image::Luma([0])
        } else {
            image::Luma([255])
        }
    })
}

#[test]
fn thin_line_chart_is_summarized() {
    let png = encode_png(&thin_line_chart());
    let result = trendline_pipeline::analyze(&png, &PipelineConfig::default()).unwrap();
    assert!(result.point_count >= 3);
    assert!(result.trend_points.len() >= 2);
    assert!(
        result
            .summary
            .to_string()
            .starts_with("Overall Trend: The trend is generally ")
    );
}

#[test]
fn pre_blur_erases_thin_line_chart() {
    let config = PipelineConfig {
        blur_sigma: Some(3.0),
        ..PipelineConfig::default()
    };
    let result = trendline_pipeline::process(&encode_png(&thin_line_chart()), &config);
    assert!(matches!(
        result,
        Err(PipelineError::InsufficientPoints { found: 0 })
    ));
}

#[test]
fn repeated_runs_give_identical_text() {
    let png = encode_png(&zigzag_chart());
    let config = PipelineConfig::default();
    let texts: Vec<String> = (0..3)
        .map(|_| trendline_pipeline::process(&png, &config).unwrap().to_string())
        .collect();
    assert!(texts.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn blank_image_reports_insufficient_points_envelope() {
    let blank = GrayImage::from_pixel(50, 50, image::Luma([255]));
    let result = trendline_pipeline::process(&encode_png(&blank), &PipelineConfig::default());
    assert!(matches!(
        result,
        Err(PipelineError::InsufficientPoints { found: 0 })
    ));

    let json = serde_json::to_value(TrendResponse::from(result)).unwrap();
    let message = json["error"].as_str().unwrap();
    assert!(message.starts_with("at least 3 points required to form a convex hull"));
}

#[test]
fn success_envelope_carries_summary_text() {
    let png = encode_png(&zigzag_chart());
    let result = trendline_pipeline::process(&png, &PipelineConfig::default());
    let text = result.as_ref().unwrap().to_string();
    let json = serde_json::to_value(TrendResponse::from(result)).unwrap();
    assert_eq!(json["summary"].as_str().unwrap(), text);
}

#[test]
fn threads_can_share_the_pipeline() {
    let png = encode_png(&zigzag_chart());
    let config = PipelineConfig::default();
    let expected = trendline_pipeline::process(&png, &config).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| trendline_pipeline::process(&png, &config).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
