use crate::series::LabeledProportion;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;

/// Slice colours, applied in order and repeated when a chart has more
/// slices than entries.
pub const PALETTE: [&str; 9] = [
    "#5470c6", "#91cc75", "#fac858", "#ee6666", "#73c0de", "#3ba272", "#fc8452", "#9a60b4",
    "#ea7ccc",
];

const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";
const FONT_SIZE: f64 = 12.0;
const CHAR_WIDTH: f64 = 7.0;
const SWATCH_WIDTH: f64 = 25.0;
const SWATCH_HEIGHT: f64 = 14.0;
const SWATCH_GAP: f64 = 5.0;
const ITEM_GAP: f64 = 10.0;
const ROW_HEIGHT: f64 = 24.0;
const MARGIN: f64 = 20.0;
const PIE_FILL: f64 = 0.75;
const MIN_PIE_RADIUS: f64 = 100.0;

/// Global options shared by every chart the report produces.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub background: String,

    /// Distance from the top edge to the legend, as a percentage of the
    /// canvas height.
    pub legend_top_percent: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 600,
            height: 500,
            background: String::from("#FFFFFF"),
            legend_top_percent: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slice {
    pub label: String,
    pub weight: f64,
    pub color: &'static str,
}

/// A single-series pie chart, rendered to SVG markup through its
/// `Display` implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct PieChart {
    options: ChartOptions,
    slices: Vec<Slice>,
}

impl PieChart {
    pub fn new<T: Copy + Into<f64>>(options: ChartOptions, series: &[LabeledProportion<T>]) -> Self {
        let slices = series
            .iter()
            .zip(PALETTE.iter().cycle())
            .map(|(item, &color)| Slice {
                label: item.label.clone(),
                weight: item.weight(),
                color,
            })
            .collect();

        Self { options, slices }
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn to_svg(&self) -> String {
        self.to_string()
    }

    /// Lays the legend out in centred rows that fit inside the canvas.
    ///
    /// Labels too wide for a row are shortened. The legend never takes more
    /// rows than leaves the pie at least `MIN_PIE_RADIUS`; entries that do
    /// not fit are summarised on a final "+N more" row.
    fn legend(&self, top: f64) -> Legend {
        let width = f64::from(self.options.width);
        let max_row_width = (width - 2.0 * MARGIN).max(0.0);

        let mut rows: Vec<Vec<LegendItem>> = Vec::new();
        let mut row: Vec<LegendItem> = Vec::new();
        let mut row_width = 0.0;

        let mut finish_row = |row: Vec<LegendItem>, row_width: f64| {
            let start = ((width - row_width) / 2.0).max(MARGIN);
            rows.push(
                row.into_iter()
                    .map(|item| LegendItem {
                        x: start + item.x,
                        ..item
                    })
                    .collect(),
            );
        };

        for (idx, slice) in self.slices.iter().enumerate() {
            let text = fit_label(&slice.label, max_row_width);
            let item_width = legend_item_width(&text);

            if !row.is_empty() && row_width + ITEM_GAP + item_width > max_row_width {
                finish_row(std::mem::take(&mut row), row_width);
                row_width = 0.0;
            }

            let x = if row.is_empty() { 0.0 } else { row_width + ITEM_GAP };
            row.push(LegendItem {
                slice: idx,
                x,
                text,
            });
            row_width = x + item_width;
        }

        if !row.is_empty() {
            finish_row(row, row_width);
        }

        let max_rows = self.max_legend_rows(top);
        if rows.len() <= max_rows {
            return Legend { rows, hidden: 0 };
        }

        rows.truncate(max_rows - 1);
        let shown: usize = rows.iter().map(Vec::len).sum();
        Legend {
            rows,
            hidden: self.slices.len() - shown,
        }
    }

    fn max_legend_rows(&self, top: f64) -> usize {
        let height = f64::from(self.options.height);
        let min_area = 2.0 * MIN_PIE_RADIUS / PIE_FILL;
        let available = height - top - MARGIN - min_area;
        ((available / ROW_HEIGHT).floor() as usize).max(1)
    }

    fn write_legend(&self, f: &mut fmt::Formatter<'_>, legend: &Legend, top: f64) -> fmt::Result {
        for (row_idx, row) in legend.rows.iter().enumerate() {
            let y = top + row_idx as f64 * ROW_HEIGHT;
            for item in row {
                let slice = &self.slices[item.slice];
                writeln!(
                    f,
                    r#"<rect x="{:.2}" y="{:.2}" width="{}" height="{}" rx="3" fill="{}"/>"#,
                    item.x, y, SWATCH_WIDTH, SWATCH_HEIGHT, slice.color
                )?;
                writeln!(
                    f,
                    r##"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{}" fill="#333333">{}</text>"##,
                    item.x + SWATCH_WIDTH + SWATCH_GAP,
                    y + SWATCH_HEIGHT - 2.0,
                    FONT_FAMILY,
                    FONT_SIZE,
                    Escaped(&item.text)
                )?;
            }
        }

        if legend.hidden > 0 {
            let y = top + legend.rows.len() as f64 * ROW_HEIGHT;
            writeln!(
                f,
                r##"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-family="{}" font-size="{}" fill="#333333">+{} more</text>"##,
                f64::from(self.options.width) / 2.0,
                y + SWATCH_HEIGHT - 2.0,
                FONT_FAMILY,
                FONT_SIZE,
                legend.hidden
            )?;
        }

        Ok(())
    }

    /// Draws one wedge per positive slice, clockwise from twelve o'clock.
    /// Slices with zero or negative weight have no area and are skipped.
    fn write_pie(&self, f: &mut fmt::Formatter<'_>, cx: f64, cy: f64, r: f64) -> fmt::Result {
        let total: f64 = self
            .slices
            .iter()
            .map(|slice| slice.weight)
            .filter(|weight| *weight > 0.0)
            .sum();
        if total <= 0.0 || !total.is_finite() || r <= 0.0 {
            return Ok(());
        }

        let background = &self.options.background;
        let mut angle = -FRAC_PI_2;
        for slice in self.slices.iter().filter(|slice| slice.weight > 0.0) {
            let sweep = slice.weight / total * TAU;
            if sweep >= TAU - 1e-9 {
                writeln!(
                    f,
                    r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
                    cx, cy, r, slice.color
                )?;
                continue;
            }

            let end = angle + sweep;
            let large_arc = if sweep > std::f64::consts::PI { 1 } else { 0 };
            writeln!(
                f,
                r#"<path d="M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2} Z" fill="{}" stroke="{}" stroke-width="1"/>"#,
                cx,
                cy,
                cx + r * angle.cos(),
                cy + r * angle.sin(),
                r,
                r,
                large_arc,
                cx + r * end.cos(),
                cy + r * end.sin(),
                slice.color,
                background
            )?;
            angle = end;
        }

        Ok(())
    }
}

impl fmt::Display for PieChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = f64::from(self.options.width);
        let height = f64::from(self.options.height);

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.options.width,
            h = self.options.height
        )?;
        writeln!(
            f,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.options.width,
            self.options.height,
            Escaped(&self.options.background)
        )?;

        let legend_top = height * self.options.legend_top_percent / 100.0;
        let legend = self.legend(legend_top);
        self.write_legend(f, &legend, legend_top)?;

        // The pie fills whatever is left below the legend.
        let area_top = legend_top + legend.height() + MARGIN / 2.0;
        let area_height = (height - area_top - MARGIN / 2.0).max(0.0);
        let radius = PIE_FILL * width.min(area_height) / 2.0;
        self.write_pie(f, width / 2.0, area_top + area_height / 2.0, radius)?;

        writeln!(f, "</svg>")
    }
}

struct LegendItem {
    slice: usize,
    x: f64,
    text: String,
}

struct Legend {
    rows: Vec<Vec<LegendItem>>,
    hidden: usize,
}

impl Legend {
    fn height(&self) -> f64 {
        let overflow = usize::from(self.hidden > 0);
        (self.rows.len() + overflow) as f64 * ROW_HEIGHT
    }
}

fn legend_item_width(text: &str) -> f64 {
    SWATCH_WIDTH + SWATCH_GAP + text.chars().count() as f64 * CHAR_WIDTH
}

/// Shortens `label` with a trailing ellipsis so its legend entry fits in
/// `max_width`.
fn fit_label(label: &str, max_width: f64) -> String {
    let max_chars = ((max_width - SWATCH_WIDTH - SWATCH_GAP) / CHAR_WIDTH)
        .floor()
        .max(1.0) as usize;
    if label.chars().count() <= max_chars {
        return label.to_string();
    }

    label
        .chars()
        .take(max_chars - 1)
        .chain(std::iter::once('…'))
        .collect()
}

/// XML-escapes text written into markup.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                c => write!(f, "{}", c)?,
            }
        }

        Ok(())
    }
}
