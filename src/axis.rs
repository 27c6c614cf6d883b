//! Axis groups: a domain line plus one tick mark and label per tick value.

use crate::{
    format::{js_number, FormatSpec},
    markup::Element,
    scale::Scale,
};

/// Ticks are drawn on pixel centers.
const OFFSET: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orient {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone)]
pub struct Axis {
    orient: Orient,
    scale: Scale,
    tick_count: f64,
    tick_format: Option<FormatSpec>,
    tick_size_inner: f64,
    tick_size_outer: f64,
    tick_padding: f64,
    domain_line: bool,
    grid: Option<(f64, f64)>,
}

impl Axis {
    pub fn new(orient: Orient, scale: Scale) -> Self {
        Self {
            orient,
            scale,
            tick_count: 10.,
            tick_format: None,
            tick_size_inner: 6.,
            tick_size_outer: 6.,
            tick_padding: 3.,
            domain_line: true,
            grid: None,
        }
    }
    pub fn left(scale: Scale) -> Self {
        Self::new(Orient::Left, scale)
    }
    pub fn bottom(scale: Scale) -> Self {
        Self::new(Orient::Bottom, scale)
    }
    pub fn ticks(mut self, count: f64, format: Option<FormatSpec>) -> Self {
        self.tick_count = count;
        self.tick_format = format;
        self
    }
    pub fn tick_size_outer(mut self, size: f64) -> Self {
        self.tick_size_outer = size;
        self
    }
    /// Leaves out the line along the scale's range.
    pub fn without_domain(mut self) -> Self {
        self.domain_line = false;
        self
    }
    /// Repeats every tick line across `length` pixels at the given stroke opacity.
    pub fn grid(mut self, length: f64, opacity: f64) -> Self {
        self.grid = Some((length, opacity));
        self
    }

    fn direction(&self) -> f64 {
        match self.orient {
            Orient::Top | Orient::Left => -1.,
            Orient::Right | Orient::Bottom => 1.,
        }
    }

    fn vertical(&self) -> bool {
        matches!(self.orient, Orient::Left | Orient::Right)
    }

    fn translate(&self, position: f64) -> String {
        if self.vertical() {
            format!("translate(0,{})", js_number(position))
        } else {
            format!("translate({},0)", js_number(position))
        }
    }

    fn domain_path(&self) -> String {
        let (r0, r1) = self.scale.range();
        let (r0, r1) = (js_number(r0 + OFFSET), js_number(r1 + OFFSET));
        let outer = js_number(self.direction() * self.tick_size_outer);
        let offset = js_number(OFFSET);
        match (self.vertical(), self.tick_size_outer != 0.) {
            (true, true) => format!("M{outer},{r0}H{offset}V{r1}H{outer}"),
            (true, false) => format!("M{offset},{r0}V{r1}"),
            (false, true) => format!("M{r0},{outer}V{offset}H{r1}V{outer}"),
            (false, false) => format!("M{r0},{offset}H{r1}"),
        }
    }

    /// Renders the axis into `group`, which usually already carries a
    /// `transform` placing the axis next to the plot.
    pub fn render_into(&self, group: Element) -> Element {
        let k = self.direction();
        let (pos_attr, cross_attr) = if self.vertical() { ("y", "x") } else { ("x", "y") };
        let line_attr = format!("{cross_attr}2");
        let spacing = self.tick_size_inner.max(0.) + self.tick_padding;
        let dy = match self.orient {
            Orient::Top => "0em",
            Orient::Bottom => "0.71em",
            Orient::Left | Orient::Right => "0.32em",
        };
        let anchor = match self.orient {
            Orient::Right => "start",
            Orient::Left => "end",
            Orient::Top | Orient::Bottom => "middle",
        };
        let format = self.scale.tick_format(self.tick_count, self.tick_format);
        tracing::trace!(orient = ?self.orient, pos_attr, "rendering axis");

        let mut group = group
            .attr("fill", "none")
            .attr("font-size", 10)
            .attr("font-family", "sans-serif")
            .attr("text-anchor", anchor);
        if self.domain_line {
            group.push(
                Element::new("path")
                    .attr("class", "domain")
                    .attr("stroke", "currentColor")
                    .attr("d", self.domain_path()),
            );
        }
        for value in self.scale.ticks(self.tick_count) {
            let line = Element::new("line")
                .attr("stroke", "currentColor")
                .attr(&line_attr, js_number(k * self.tick_size_inner));
            let mut tick = Element::new("g")
                .attr("class", "tick")
                .attr("opacity", 1)
                .attr("transform", self.translate(self.scale.map(value) + OFFSET))
                .child(line.clone());
            if let Some((length, opacity)) = self.grid {
                let mut grid_line = line;
                grid_line
                    .set_attr(&line_attr, js_number(length))
                    .set_attr("stroke-opacity", js_number(opacity));
                tick.push(grid_line);
            }
            tick.push(
                Element::new("text")
                    .attr("fill", "currentColor")
                    .attr(cross_attr, js_number(k * spacing))
                    .attr("dy", dy)
                    .text(format.format(value)),
            );
            group.push(tick);
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_axis_layout() {
        let scale = Scale::linear((0., 10.), (40., 610.));
        let g = Axis::bottom(scale)
            .ticks(2., None)
            .tick_size_outer(0.)
            .render_into(Element::new("g"));
        assert_eq!(g.get_attr("text-anchor"), Some("middle"));
        let domain = g.find_all("path");
        assert_eq!(domain[0].get_attr("d"), Some("M40.5,0.5H610.5"));
        let ticks: Vec<_> = g.elements().filter(|e| e.get_attr("class") == Some("tick")).collect();
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[1].get_attr("transform"), Some("translate(325.5,0)"));
        assert_eq!(ticks[1].text_content(), "5");
    }

    #[test]
    fn left_axis_with_grid() {
        let scale = Scale::linear((0., 4.), (370., 20.));
        let g = Axis::left(scale)
            .ticks(4., None)
            .without_domain()
            .grid(570., 0.1)
            .render_into(Element::new("g").attr("transform", "translate(40,0)"));
        assert!(g.find_all("path").is_empty());
        let first = g.elements().next().expect("tick");
        let lines: Vec<_> = first.find_all("line");
        assert_eq!(lines[0].get_attr("x2"), Some("-6"));
        assert_eq!(lines[1].get_attr("x2"), Some("570"));
        assert_eq!(lines[1].get_attr("stroke-opacity"), Some("0.1"));
        assert_eq!(first.find_all("text")[0].get_attr("x"), Some("-9"));
        assert_eq!(g.get_attr("transform"), Some("translate(40,0)"));
    }
}
