use std::path::PathBuf;

use histscrub::{bin, ChartError, HistogramOptions, ScaleKind, Thresholds};
use plotters::prelude::*;

fn ramp(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

#[test]
fn bins_cover_data_without_gaps() {
    let data: Vec<f64> = (0..500).map(|i| ((i * 37) % 101) as f64 / 7.).collect();
    let chart = HistogramOptions::<f64>::new().resolve().unwrap();
    let layout = chart.layout(&data);
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert!(layout.bins[0].x0 <= min);
    assert!(layout.bins.last().unwrap().x1 >= max);
    for pair in layout.bins.windows(2) {
        assert_eq!(pair[0].x1, pair[1].x0);
    }
    assert_eq!(layout.heights.iter().sum::<f64>(), data.len() as f64);
    assert_eq!(layout.x_domain, (layout.bins[0].x0, layout.bins.last().unwrap().x1));
}

#[test]
fn weighted_heights_sum_to_total_weight() {
    let data: Vec<(f64, f64)> = (0..50).map(|i| (i as f64, (i % 3) as f64 + 0.5)).collect();
    let mut options = HistogramOptions::with_value(|d: &(f64, f64)| d.0);
    options.set_y(|d| d.1).set_thresholds(Thresholds::Sturges);
    let layout = options.resolve().unwrap().layout(&data);
    let weights: f64 = data.iter().map(|d| d.1).sum();
    assert!((layout.heights.iter().sum::<f64>() - weights).abs() < 1e-9);
}

#[test]
fn normalized_heights_sum_to_one() {
    let mut options = HistogramOptions::<f64>::new();
    options.set_normalize(true);
    let chart = options.resolve().unwrap();
    assert_eq!(chart.y_format(), Some("%".parse().unwrap()));
    let layout = chart.layout(&ramp(73));
    assert!((layout.heights.iter().sum::<f64>() - 1.).abs() < 1e-9);
}

#[test]
fn axis_qualified_settings_win() {
    let mut options = HistogramOptions::<f64>::new();
    options
        .set_domain(0. ..100.)
        .set_x_domain(10. ..20.)
        .set_label("short")
        .set_x_label("qualified");
    let chart = options.resolve().unwrap();
    assert_eq!(chart.x_label(), Some("qualified"));
    assert_eq!(chart.y_label(), "\u{2191} Frequency");
    assert_eq!(chart.layout(&ramp(30)).x_domain, (10., 20.));
}

#[test]
fn invalid_format_is_rejected() {
    let mut options = HistogramOptions::<f64>::new();
    options.set_x_format(".q");
    assert!(matches!(
        options.resolve(),
        Err(ChartError::InvalidFormat { spec }) if spec == ".q"
    ));
}

#[test]
fn empty_data_renders_axes_only() {
    let chart = HistogramOptions::<f64>::new().resolve().unwrap();
    let layout = chart.layout(&[]);
    assert!(layout.bins.is_empty());
    assert_eq!(layout.x_domain, (0., 1.));
    assert_eq!(layout.y_domain, (0., 1.));
    let svg = chart.render(&[]);
    assert!(svg.find_all("rect").is_empty());
    assert_eq!(svg.elements().count(), 3);
}

#[test]
fn svg_has_one_bar_per_bin() {
    let mut options = HistogramOptions::<f64>::new();
    options.set_thresholds(Thresholds::Count(4)).set_label("value");
    let chart = options.resolve().unwrap();
    let svg = chart.render(&ramp(20));

    assert_eq!(svg.get_attr("width"), Some("640"));
    assert_eq!(svg.get_attr("viewBox"), Some("0,0,640,400"));
    let groups: Vec<_> = svg.elements().collect();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].get_attr("transform"), Some("translate(40,0)"));
    assert_eq!(groups[1].get_attr("fill"), Some("currentColor"));
    assert_eq!(groups[2].get_attr("transform"), Some("translate(0,370)"));

    let rects = svg.find_all("rect");
    assert_eq!(rects.len(), 4);
    assert_eq!(rects[0].get_attr("x"), Some("40.5"));
    assert_eq!(rects[0].get_attr("width"), Some("141.5"));
    assert_eq!(rects[0].get_attr("y"), Some("20"));
    assert_eq!(rects[0].get_attr("height"), Some("350"));
    let title = rects[0].find_all("title")[0].text_content();
    assert!(title.starts_with("0 \u{2264} x < 5\n"), "{title}");
    assert!(title.ends_with("5.00"), "{title}");

    let text = svg.to_string();
    assert!(text.contains("\u{2191} Frequency"));
    assert!(text.contains(">value</text>"));
    assert!(text.contains("stroke-opacity=\"0.1\""));
}

#[test]
fn log_scale_renders() {
    let data: Vec<f64> = (1..=1000).map(f64::from).collect();
    let mut options = HistogramOptions::<f64>::new();
    options.set_x_type(ScaleKind::Log).set_thresholds(Thresholds::Count(10));
    let svg = options.resolve().unwrap().render(&data);
    assert!(!svg.find_all("rect").is_empty());
}

#[test]
fn parallel_projection_matches_sequential_binning() {
    let data: Vec<f64> = (0..20_000).map(|i| ((i as f64) * 0.618).fract() * 50.).collect();
    let chart = HistogramOptions::<f64>::new().resolve().unwrap();
    let layout = chart.layout(&data);
    assert_eq!(layout.bins, bin(&data, &Thresholds::default()));
}

#[test]
fn save_svg_file() {
    let mut path = PathBuf::from(env!("CARGO_TARGET_TMPDIR"));
    path.push("histogram.svg");
    let chart = HistogramOptions::<f64>::new().resolve().unwrap();
    chart.save_svg(&ramp(100), &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
}

#[test]
fn draw_on_bitmap() {
    let chart = HistogramOptions::<f64>::new().resolve().unwrap();
    let data = ramp(20);
    let mut buf = vec![0u8; 640 * 400 * 3];
    let root = BitMapBackend::with_buffer(&mut buf, (640, 400)).into_drawing_area();
    let drawn = chart.draw_on(&data, &root);
    match drawn {
        Ok(to_data) => {
            let (x, y) = to_data((320, 200)).unwrap();
            assert!((0. ..=20.).contains(&x), "{x}");
            assert!(y >= 0., "{y}");
        }
        // text rendering needs a system font
        Err(e) => eprintln!("skipping bitmap check: {e}"),
    };
}

#[test]
fn unparsable_color_draws_without_panicking() {
    let mut options = HistogramOptions::<f64>::new();
    options.set_color("#a\u{e9}");
    let chart = options.resolve().unwrap();
    let mut buf = vec![0u8; 320 * 200 * 3];
    let root = BitMapBackend::with_buffer(&mut buf, (320, 200)).into_drawing_area();
    let drawn = chart.draw_on(&[1.0, 2.0], &root).map(drop);
    if let Err(e) = drawn {
        eprintln!("skipping bitmap check: {e}");
    }
}

#[test]
fn save_png_file() {
    let mut path = PathBuf::from(env!("CARGO_TARGET_TMPDIR"));
    path.push("histogram.png");
    let chart = HistogramOptions::<f64>::new().resolve().unwrap();
    match chart.save_png(&ramp(100), &path) {
        Ok(()) => assert!(path.exists()),
        Err(ChartError::Drawing(e)) => eprintln!("skipping png check: {e}"),
        Err(e) => panic!("{e}"),
    }
}
