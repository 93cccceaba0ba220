//! Table images: statistics, class intervals and per-month box statistics.
//!
//! Cells are plain rectangles with centred text. The header row and the
//! first column use the variable's colour and tint; body rows alternate
//! between white and a light grey.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::{Variable, month_label};
use crate::error::AppError;
use crate::plot::canvas::{Canvas, DrawResult, bold, font, rgb, with_canvas};
use crate::report::format::{fmt_num, statistics_rows};
use crate::stats::{ClassInterval, MonthlyStatistics, Statistics};

const ROW_HEIGHT: i32 = 34;
const TITLE_HEIGHT: i32 = 60;
const MARGIN: i32 = 20;
const CHAR_WIDTH: i32 = 10;
const MIN_COL_WIDTH: i32 = 90;
const BAND: RGBColor = RGBColor(0xF2, 0xF2, 0xF2);

/// A rendered table: title, header and body cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Column widths in pixels, sized to the longest cell of each column.
    fn column_widths(&self) -> Vec<i32> {
        (0..self.header.len())
            .map(|col| {
                let longest = std::iter::once(&self.header[col])
                    .chain(self.rows.iter().filter_map(|r| r.get(col)))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                (longest as i32 * CHAR_WIDTH + 24).max(MIN_COL_WIDTH)
            })
            .collect()
    }

    fn size(&self) -> (u32, u32) {
        let width: i32 = self.column_widths().iter().sum::<i32>() + 2 * MARGIN;
        let height = TITLE_HEIGHT + (self.rows.len() as i32 + 1) * ROW_HEIGHT + 2 * MARGIN;
        (width.max(400) as u32, height as u32)
    }
}

/// Summary statistics as a two-column table.
pub fn statistics_table(variable: Variable, stats: &Statistics) -> Table {
    Table {
        title: format!("Estadísticas Descriptivas - {}", variable.dataset_title()),
        header: vec!["Estadístico".to_string(), "Valor".to_string()],
        rows: statistics_rows(stats)
            .into_iter()
            .map(|(name, value)| vec![name.to_string(), value])
            .collect(),
    }
}

/// Class-interval frequency table.
pub fn intervals_table(variable: Variable, intervals: &[ClassInterval]) -> Table {
    Table {
        title: format!("Tabla de Frecuencias por Intervalos - {}", variable.dataset_title()),
        header: [
            "Intervalo",
            "Marca de Clase",
            "Frec. Absoluta",
            "Frec. Relativa",
            "Frec. Abs. Acumulada",
            "Frec. Rel. Acumulada",
        ]
        .map(String::from)
        .to_vec(),
        rows: intervals
            .iter()
            .map(|c| {
                vec![
                    c.label.clone(),
                    fmt_num(c.midpoint),
                    c.abs_freq.to_string(),
                    format!("{:.4}", c.rel_freq),
                    c.cum_abs_freq.to_string(),
                    format!("{:.4}", c.cum_rel_freq),
                ]
            })
            .collect(),
    }
}

const MONTHLY_HEADER: [&str; 11] = [
    "Mes",
    "n",
    "Media",
    "Mediana",
    "Moda",
    "Rango",
    "Varianza",
    "Desv. Est.",
    "CV (%)",
    "Mínimo",
    "Máximo",
];

/// Per-month statistics behind the box plot.
///
/// Absent months show `N/A` in every cell; single-observation months only in
/// the dispersion cells.
pub fn monthly_statistics_table(variable: Variable, monthly: &[MonthlyStatistics]) -> Table {
    Table {
        title: format!("Estadísticas Mensuales - {}", variable.short_title()),
        header: MONTHLY_HEADER.map(String::from).to_vec(),
        rows: monthly
            .iter()
            .map(|m| {
                let mut row = vec![month_label(m.month).to_string()];
                match &m.stats {
                    Some(s) => row.extend([
                        s.n.to_string(),
                        fmt_num(s.mean),
                        fmt_num(s.median),
                        fmt_num(s.mode),
                        fmt_num(s.range),
                        fmt_num(s.variance),
                        fmt_num(s.std_dev),
                        fmt_num(s.coef_variation),
                        fmt_num(s.min),
                        fmt_num(s.max),
                    ]),
                    None => row.extend(std::iter::repeat_n("N/A".to_string(), MONTHLY_HEADER.len() - 1)),
                }
                row
            })
            .collect(),
    }
}

/// Render `table` to `path`.
///
/// Needs a registered font; callers check `text_enabled()` first.
pub fn table_image(path: &Path, table: &Table, variable: Variable) -> Result<(), AppError> {
    with_canvas(path, table.size(), |root| draw_table(root, table, variable))
}

fn draw_table(root: &Canvas<'_>, table: &Table, variable: Variable) -> DrawResult<()> {
    let header_fill = rgb(variable.color());
    let first_col_fill = rgb(variable.tint());
    let widths = table.column_widths();
    let centred = Pos::new(HPos::Center, VPos::Center);

    let (width, _) = table.size();
    root.draw(&Text::new(
        table.title.clone(),
        (width as i32 / 2, MARGIN + TITLE_HEIGHT / 2 - 6),
        bold(22).pos(centred),
    ))?;

    let top = MARGIN + TITLE_HEIGHT;
    let rows = std::iter::once(&table.header).chain(table.rows.iter());
    for (r, row) in rows.enumerate() {
        let y0 = top + r as i32 * ROW_HEIGHT;
        let y1 = y0 + ROW_HEIGHT;
        let mut x0 = MARGIN;

        for (c, w) in widths.iter().enumerate() {
            let x1 = x0 + w;
            let fill = match (r, c) {
                (0, _) => header_fill,
                (_, 0) => first_col_fill,
                (r, _) if r % 2 == 0 => BAND,
                _ => WHITE,
            };
            root.draw(&Rectangle::new([(x0, y0), (x1, y1)], fill.filled()))?;
            root.draw(&Rectangle::new([(x0, y0), (x1, y1)], BLACK.stroke_width(1)))?;

            let cell = row.get(c).map(String::as_str).unwrap_or("");
            let style = if r == 0 {
                bold(16).color(&WHITE).pos(centred)
            } else {
                font(15).pos(centred)
            };
            root.draw(&Text::new(cell.to_string(), ((x0 + x1) / 2, (y0 + y1) / 2), style))?;
            x0 = x1;
        }
    }
    Ok(())
}
