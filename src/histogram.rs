use std::{ops::Range, path::Path, sync::Arc};

use plotters::{coord::Shift, prelude::*};

use crate::{
    axis::Axis,
    binning::{bin, Bin, Thresholds},
    error::ChartError,
    format::{js_number, FormatSpec},
    markup::Element,
    scale::{Scale, ScaleKind},
    Datum, DrawRange,
};

/// Projects a record onto a number.
pub type Accessor<T> = Arc<dyn Fn(&T) -> f64 + Send + Sync>;

pub const DEFAULT_Y_LABEL: &str = "\u{2191} Frequency";
const SVG_NS: &str = "http://www.w3.org/2000/svg";
const SVG_STYLE: &str = "max-width: 100%; height: auto; height: intrinsic;";
#[cfg(feature = "rayon")]
const MIN_PARALLEL_LEN: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.,
            right: 30.,
            bottom: 30.,
            left: 40.,
        }
    }
}

/// Unresolved histogram settings.
///
/// Several settings come in a short and an axis-qualified form
/// (`domain`/`x_domain`, `label`/`x_label`, `format`/`x_format`,
/// `type`/`x_type`, `value`/`x`); the qualified form wins when both are set.
pub struct HistogramOptions<T> {
    value: Accessor<T>,
    x: Option<Accessor<T>>,
    y: Option<Accessor<T>>,
    thresholds: Thresholds,
    normalize: bool,
    margins: Margins,
    width: f64,
    height: f64,
    inset_left: f64,
    inset_right: f64,
    kind: ScaleKind,
    x_kind: Option<ScaleKind>,
    domain: DrawRange<Range<f64>>,
    x_domain: DrawRange<Range<f64>>,
    x_range: Option<Range<f64>>,
    label: Option<String>,
    x_label: Option<String>,
    format: Option<String>,
    x_format: Option<String>,
    y_kind: ScaleKind,
    y_domain: DrawRange<Range<f64>>,
    y_range: Option<Range<f64>>,
    y_label: Option<String>,
    y_format: Option<String>,
    color: String,
}

impl<T: Datum + 'static> HistogramOptions<T> {
    pub fn new() -> Self {
        Self::with_value(|d: &T| d.value())
    }
}

impl<T: Datum + 'static> Default for HistogramOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> HistogramOptions<T> {
    pub fn with_value(value: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            value: Arc::new(value),
            x: None,
            y: None,
            thresholds: Thresholds::default(),
            normalize: false,
            margins: Margins::default(),
            width: 640.,
            height: 400.,
            inset_left: 0.5,
            inset_right: 0.5,
            kind: ScaleKind::Linear,
            x_kind: None,
            domain: DrawRange::Auto,
            x_domain: DrawRange::Auto,
            x_range: None,
            label: None,
            x_label: None,
            format: None,
            x_format: None,
            y_kind: ScaleKind::Linear,
            y_domain: DrawRange::Auto,
            y_range: None,
            y_label: None,
            y_format: None,
            color: "currentColor".to_string(),
        }
    }
    pub fn set_value(&mut self, f: impl Fn(&T) -> f64 + Send + Sync + 'static) -> &mut Self {
        self.value = Arc::new(f);
        self
    }
    pub fn set_x(&mut self, f: impl Fn(&T) -> f64 + Send + Sync + 'static) -> &mut Self {
        self.x = Some(Arc::new(f));
        self
    }
    /// Weight of each record; every record counts once by default.
    pub fn set_y(&mut self, f: impl Fn(&T) -> f64 + Send + Sync + 'static) -> &mut Self {
        self.y = Some(Arc::new(f));
        self
    }
    pub fn set_thresholds(&mut self, thresholds: Thresholds) -> &mut Self {
        self.thresholds = thresholds;
        self
    }
    /// Scales bin heights so that they sum to one.
    pub fn set_normalize(&mut self, normalize: bool) -> &mut Self {
        self.normalize = normalize;
        self
    }
    pub fn set_margins(&mut self, margins: Margins) -> &mut Self {
        self.margins = margins;
        self
    }
    pub fn set_size(&mut self, width: f64, height: f64) -> &mut Self {
        self.width = width;
        self.height = height;
        self
    }
    pub fn set_insets(&mut self, left: f64, right: f64) -> &mut Self {
        self.inset_left = left;
        self.inset_right = right;
        self
    }
    pub fn set_type(&mut self, kind: ScaleKind) -> &mut Self {
        self.kind = kind;
        self
    }
    pub fn set_x_type(&mut self, kind: ScaleKind) -> &mut Self {
        self.x_kind = Some(kind);
        self
    }
    pub fn set_domain(&mut self, x: Range<f64>) -> &mut Self {
        self.domain = DrawRange::Static(x);
        self
    }
    pub fn set_x_domain(&mut self, x: Range<f64>) -> &mut Self {
        self.x_domain = DrawRange::Static(x);
        self
    }
    /// Pixel extent of the x axis, `[left, right]`.
    pub fn set_x_range(&mut self, x: Range<f64>) -> &mut Self {
        self.x_range = Some(x);
        self
    }
    pub fn set_label<S: ToString>(&mut self, s: S) -> &mut Self {
        self.label = Some(s.to_string());
        self
    }
    pub fn set_x_label<S: ToString>(&mut self, s: S) -> &mut Self {
        self.x_label = Some(s.to_string());
        self
    }
    pub fn set_format<S: ToString>(&mut self, s: S) -> &mut Self {
        self.format = Some(s.to_string());
        self
    }
    pub fn set_x_format<S: ToString>(&mut self, s: S) -> &mut Self {
        self.x_format = Some(s.to_string());
        self
    }
    pub fn set_y_type(&mut self, kind: ScaleKind) -> &mut Self {
        self.y_kind = kind;
        self
    }
    pub fn set_y_domain(&mut self, y: Range<f64>) -> &mut Self {
        self.y_domain = DrawRange::Static(y);
        self
    }
    /// Pixel extent of the y axis, `[bottom, top]`.
    pub fn set_y_range(&mut self, y: Range<f64>) -> &mut Self {
        self.y_range = Some(y);
        self
    }
    pub fn set_y_label<S: ToString>(&mut self, s: S) -> &mut Self {
        self.y_label = Some(s.to_string());
        self
    }
    pub fn set_y_format<S: ToString>(&mut self, s: S) -> &mut Self {
        self.y_format = Some(s.to_string());
        self
    }
    pub fn set_color<S: ToString>(&mut self, s: S) -> &mut Self {
        self.color = s.to_string();
        self
    }

    /// Settles aliases and defaults into a ready-to-render [`Histogram`].
    pub fn resolve(self) -> Result<Histogram<T>, ChartError> {
        let x_format = self
            .x_format
            .or(self.format)
            .map(|s| s.parse::<FormatSpec>())
            .transpose()?;
        let y_format = match self.y_format {
            Some(s) => Some(s.parse::<FormatSpec>()?),
            None if self.normalize => Some("%".parse::<FormatSpec>()?),
            None => None,
        };
        let x_domain = match self.x_domain {
            DrawRange::Static(x) => DrawRange::Static(x),
            DrawRange::Auto => self.domain,
        };
        let m = self.margins;
        Ok(Histogram {
            x: self.x.unwrap_or(self.value),
            y: self.y.unwrap_or_else(|| Arc::new(|_: &T| 1.)),
            thresholds: self.thresholds,
            normalize: self.normalize,
            margins: m,
            width: self.width,
            height: self.height,
            inset_left: self.inset_left,
            inset_right: self.inset_right,
            x_kind: self.x_kind.unwrap_or(self.kind),
            x_domain,
            x_range: self.x_range.unwrap_or(m.left..self.width - m.right),
            x_label: self.x_label.or(self.label),
            x_format,
            y_kind: self.y_kind,
            y_domain: self.y_domain,
            y_range: self
                .y_range
                .unwrap_or(self.height - m.bottom..m.top),
            y_label: self
                .y_label
                .unwrap_or_else(|| DEFAULT_Y_LABEL.to_string()),
            y_format,
            color: self.color,
        })
    }
}

/// Bins, bin heights and domains computed for one data set.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramLayout {
    pub bins: Vec<Bin>,
    pub heights: Vec<f64>,
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
}

/// A resolved histogram chart; see [`HistogramOptions`].
pub struct Histogram<T> {
    x: Accessor<T>,
    y: Accessor<T>,
    thresholds: Thresholds,
    normalize: bool,
    margins: Margins,
    width: f64,
    height: f64,
    inset_left: f64,
    inset_right: f64,
    x_kind: ScaleKind,
    x_domain: DrawRange<Range<f64>>,
    x_range: Range<f64>,
    x_label: Option<String>,
    x_format: Option<FormatSpec>,
    y_kind: ScaleKind,
    y_domain: DrawRange<Range<f64>>,
    y_range: Range<f64>,
    y_label: String,
    y_format: Option<FormatSpec>,
    color: String,
}

#[cfg(feature = "rayon")]
fn project<T: Sync>(data: &[T], f: &Accessor<T>) -> Vec<f64> {
    use rayon::prelude::*;
    if data.len() < MIN_PARALLEL_LEN {
        return data.iter().map(|d| f(d)).collect();
    }
    data.par_iter().map(|d| f(d)).collect()
}

#[cfg(not(feature = "rayon"))]
fn project<T: Sync>(data: &[T], f: &Accessor<T>) -> Vec<f64> {
    data.iter().map(|d| f(d)).collect()
}

impl<T: Sync> Histogram<T> {
    pub fn width(&self) -> f64 {
        self.width
    }
    pub fn height(&self) -> f64 {
        self.height
    }
    pub fn margins(&self) -> Margins {
        self.margins
    }
    pub fn x_label(&self) -> Option<&str> {
        self.x_label.as_deref()
    }
    pub fn y_label(&self) -> &str {
        &self.y_label
    }
    pub fn y_format(&self) -> Option<FormatSpec> {
        self.y_format
    }
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn layout(&self, data: &[T]) -> HistogramLayout {
        let xs = project(data, &self.x);
        let weights = project(data, &self.y);
        let bins = bin(&xs, &self.thresholds);
        let mut heights: Vec<f64> = bins
            .iter()
            .map(|b| b.indices.iter().map(|&i| weights[i]).sum())
            .collect();
        if self.normalize {
            // a zero total leaves NaN heights
            let total: f64 = heights.iter().sum();
            heights.iter_mut().for_each(|h| *h /= total);
        }
        let x_domain = match self.x_domain {
            DrawRange::Static(ref x) => (x.start, x.end),
            DrawRange::Auto => match (bins.first(), bins.last()) {
                (Some(first), Some(last)) => (first.x0, last.x1),
                _ => (0., 1.),
            },
        };
        let y_domain = match self.y_domain {
            DrawRange::Static(ref y) => (y.start, y.end),
            DrawRange::Auto if heights.is_empty() => (0., 1.),
            DrawRange::Auto => (
                0.,
                heights
                    .iter()
                    .copied()
                    .filter(|h| !h.is_nan())
                    .reduce(f64::max)
                    .unwrap_or(f64::NAN),
            ),
        };
        tracing::debug!(
            bins = bins.len(),
            ?x_domain,
            ?y_domain,
            "computed histogram layout"
        );
        HistogramLayout {
            bins,
            heights,
            x_domain,
            y_domain,
        }
    }

    fn scales(&self, layout: &HistogramLayout) -> (Scale, Scale) {
        (
            Scale::new(
                self.x_kind,
                layout.x_domain,
                (self.x_range.start, self.x_range.end),
            ),
            Scale::new(
                self.y_kind,
                layout.y_domain,
                (self.y_range.start, self.y_range.end),
            ),
        )
    }

    /// Builds the chart as a standalone `svg` element.
    pub fn render(&self, data: &[T]) -> Element {
        let layout = self.layout(data);
        let (x_scale, y_scale) = self.scales(&layout);
        let (w, h, m) = (self.width, self.height, self.margins);
        let tooltip_format = y_scale.tick_format(100., self.y_format);

        let mut svg = Element::new("svg")
            .attr("xmlns", SVG_NS)
            .attr("width", js_number(w))
            .attr("height", js_number(h))
            .attr("viewBox", format!("0,0,{},{}", js_number(w), js_number(h)))
            .attr("style", SVG_STYLE);

        let y_axis = Axis::left(y_scale)
            .ticks(h / 40., self.y_format)
            .without_domain()
            .grid(w - m.left - m.right, 0.1);
        svg.push(
            y_axis
                .render_into(
                    Element::new("g").attr("transform", format!("translate({},0)", js_number(m.left))),
                )
                .child(
                    Element::new("text")
                        .attr("x", js_number(-m.left))
                        .attr("y", 10)
                        .attr("fill", "currentColor")
                        .attr("text-anchor", "start")
                        .text(&self.y_label),
                ),
        );

        let mut bars = Element::new("g").attr("fill", &self.color);
        for (b, &height) in layout.bins.iter().zip(&layout.heights) {
            let (x0, x1) = (x_scale.map(b.x0), x_scale.map(b.x1));
            let y = y_scale.map(height);
            bars.push(
                Element::new("rect")
                    .attr("x", js_number(x0 + self.inset_left))
                    .attr(
                        "width",
                        js_number((x1 - x0 - self.inset_left - self.inset_right).max(0.)),
                    )
                    .attr("y", js_number(y))
                    .attr("height", js_number(y_scale.map(0.) - y))
                    .child(Element::new("title").text(format!(
                        "{} \u{2264} x < {}\n{}",
                        js_number(b.x0),
                        js_number(b.x1),
                        tooltip_format.format(height)
                    ))),
            );
        }
        svg.push(bars);

        let x_axis = Axis::bottom(x_scale)
            .ticks(w / 80., self.x_format)
            .tick_size_outer(0.);
        svg.push(
            x_axis
                .render_into(
                    Element::new("g")
                        .attr("transform", format!("translate(0,{})", js_number(h - m.bottom))),
                )
                .child(
                    Element::new("text")
                        .attr("x", js_number(w - m.right))
                        .attr("y", 27)
                        .attr("fill", "currentColor")
                        .attr("text-anchor", "end")
                        .text(self.x_label.as_deref().unwrap_or_default()),
                ),
        );
        svg
    }

    pub fn save_svg<P: AsRef<Path>>(&self, data: &[T], path: P) -> Result<(), ChartError> {
        std::fs::write(path, self.render(data).to_string())?;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_png<P: AsRef<Path>>(&self, data: &[T], path: P) -> Result<(), ChartError> {
        let size = (self.width.max(1.) as u32, self.height.max(1.) as u32);
        let root = BitMapBackend::new(path.as_ref(), size).into_drawing_area();
        let _to_coord = self
            .draw_on(data, &root)
            .map_err(|e| ChartError::Drawing(e.to_string()))?;
        Ok(())
    }

    /// Draws the histogram onto a plotters drawing area.
    ///
    /// Non-linear scales are drawn in transformed space. The returned closure
    /// maps a pixel position back to data coordinates.
    pub fn draw_on<DB: DrawingBackend>(
        &self,
        data: &[T],
        draw_area: &DrawingArea<DB, Shift>,
    ) -> Result<impl Fn((i32, i32)) -> Option<(f64, f64)>, DrawingAreaErrorKind<DB::ErrorType>>
    {
        let layout = self.layout(data);
        let xs = Scale::new(self.x_kind, layout.x_domain, (0., 1.));
        let ys = Scale::new(self.y_kind, layout.y_domain, (0., 1.));
        let x_span = drawable(xs.transformed_domain());
        let y_span = drawable(ys.transformed_domain());
        let baseline = Some(ys.transform(0.))
            .filter(|b| b.is_finite())
            .unwrap_or(y_span.start);
        let color = parse_color(&self.color);
        let m = self.margins;

        draw_area.fill(&WHITE)?;
        let mut ctx = ChartBuilder::on(draw_area)
            .margin_top(m.top.max(0.) as u32)
            .margin_right(m.right.max(0.) as u32)
            .x_label_area_size(m.bottom.max(0.) as u32)
            .y_label_area_size(m.left.max(0.) as u32)
            .build_cartesian_2d(x_span, y_span)?;

        let x_ticks = (self.width / 80.).max(1.);
        let y_ticks = (self.height / 40.).max(1.);
        let x_fmt = xs.tick_format(x_ticks, self.x_format);
        let y_fmt = ys.tick_format(y_ticks, self.y_format);
        let x_labeler = move |v: &f64| x_fmt.format(xs.untransform(*v));
        let y_labeler = move |v: &f64| y_fmt.format(ys.untransform(*v));
        let mut mesh = ctx.configure_mesh();
        mesh.disable_x_mesh()
            .x_labels(x_ticks as usize)
            .y_labels(y_ticks as usize)
            .x_label_formatter(&x_labeler)
            .y_label_formatter(&y_labeler)
            .y_desc(&self.y_label);
        if let Some(ref s) = self.x_label {
            mesh.x_desc(s);
        }
        mesh.draw()?;

        let (inset_left, inset_right) = (
            self.inset_left.max(0.).round() as u32,
            self.inset_right.max(0.).round() as u32,
        );
        ctx.draw_series(layout.bins.iter().zip(&layout.heights).map(|(b, &h)| {
            let mut rect = Rectangle::new(
                [
                    (xs.transform(b.x0), baseline),
                    (xs.transform(b.x1), ys.transform(h)),
                ],
                color.filled(),
            );
            rect.set_margin(0, 0, inset_left, inset_right);
            rect
        }))?;
        draw_area.present()?;
        let to_coord = ctx.into_coord_trans();
        Ok(move |p: (i32, i32)| to_coord(p).map(|(x, y)| (xs.untransform(x), ys.untransform(y))))
    }
}

/// Widens collapsed or non-finite spans so plotters can lay them out.
fn drawable((lo, hi): (f64, f64)) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        0. ..1.
    } else if lo == hi {
        lo - 0.5..hi + 0.5
    } else {
        lo..hi
    }
}

/// Resolves a CSS-style color; anything unrecognized draws black.
fn parse_color(s: &str) -> RGBColor {
    let hex = |h: &str| u8::from_str_radix(h, 16).ok();
    match s.trim().to_ascii_lowercase().as_str() {
        "steelblue" => RGBColor(70, 130, 180),
        "red" => RED,
        "green" => RGBColor(0, 128, 0),
        "blue" => BLUE,
        "gray" | "grey" => RGBColor(128, 128, 128),
        "orange" => RGBColor(255, 165, 0),
        "white" => WHITE,
        c if !c.is_ascii() => BLACK,
        c if c.len() == 7 && c.starts_with('#') => {
            match (hex(&c[1..3]), hex(&c[3..5]), hex(&c[5..7])) {
                (Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
                _ => BLACK,
            }
        }
        c if c.len() == 4 && c.starts_with('#') => {
            let digit = |i: usize| hex(&c[i..i + 1]).map(|v| v * 17);
            match (digit(1), digit(2), digit(3)) {
                (Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
                _ => BLACK,
            }
        }
        _ => BLACK,
    }
}
