//! Presentation adapter.
//!
//! A `View` pairs an aggregated `Frame` with a declarative `ChartSpec`.
//! Presenters turn views into artifacts without knowing how the frame was
//! computed; a `ChartSpec` only names frame columns.

pub mod catalogue;

use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

use crate::error::{AnalysisError, Result};
use crate::frame::Frame;
use crate::metrics::{self, MetricName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Pie,
    Bar,
    Scatter,
    Box,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Group,
}

/// Ordering of the categorical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrder {
    /// Keep frame order
    AsGiven,
    TotalDescending,
    MaxDescending,
}

/// Declarative display options for one chart.
///
/// For pies `x` names the slice labels and `y` the slice values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub orientation: Orientation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_mode: Option<BarMode>,
    pub category_order: CategoryOrder,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: &str, x: &str, y: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x: x.to_string(),
            y: y.to_string(),
            color: None,
            size: None,
            hover: None,
            color_scale: None,
            x_title: None,
            y_title: None,
            x_scale: Scale::Linear,
            y_scale: Scale::Linear,
            orientation: Orientation::Vertical,
            hole: None,
            bar_mode: None,
            category_order: CategoryOrder::AsGiven,
        }
    }

    pub fn color(mut self, column: &str) -> Self {
        self.color = Some(column.to_string());
        self
    }

    pub fn size(mut self, column: &str) -> Self {
        self.size = Some(column.to_string());
        self
    }

    pub fn hover(mut self, column: &str) -> Self {
        self.hover = Some(column.to_string());
        self
    }

    pub fn color_scale(mut self, name: &str) -> Self {
        self.color_scale = Some(name.to_string());
        self
    }

    pub fn axis_titles(mut self, x: &str, y: &str) -> Self {
        self.x_title = Some(x.to_string());
        self.y_title = Some(y.to_string());
        self
    }

    pub fn log_y(mut self) -> Self {
        self.y_scale = Scale::Log;
        self
    }

    pub fn horizontal(mut self) -> Self {
        self.orientation = Orientation::Horizontal;
        self
    }

    pub fn hole(mut self, fraction: f64) -> Self {
        self.hole = Some(fraction);
        self
    }

    pub fn bar_mode(mut self, mode: BarMode) -> Self {
        self.bar_mode = Some(mode);
        self
    }

    pub fn category_order(mut self, order: CategoryOrder) -> Self {
        self.category_order = order;
        self
    }

    fn bound_columns(&self) -> impl Iterator<Item = &str> {
        [Some(&self.x), Some(&self.y), self.color.as_ref(), self.size.as_ref(), self.hover.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Every bound column must exist in the frame
    pub fn check_bindings(&self, frame: &Frame) -> Result<()> {
        for column in self.bound_columns() {
            if frame.column_index(column).is_none() {
                return Err(AnalysisError::Schema(format!(
                    "chart '{}' binds column '{}' which its table does not have",
                    self.title, column
                )));
            }
        }
        Ok(())
    }
}

/// One renderable view: a chart spec and the table it draws
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    /// File-safe identifier
    pub slug: String,
    pub spec: ChartSpec,
    pub table: Frame,
}

impl View {
    pub fn new(slug: &str, spec: ChartSpec, table: Frame) -> Self {
        Self {
            slug: slug.to_string(),
            spec,
            table,
        }
    }
}

pub trait Presenter {
    fn present(&mut self, view: &View) -> Result<()>;
}

/// Present each view in order, stopping at the first failure
pub fn present_all<P: Presenter + ?Sized>(presenter: &mut P, views: &[View]) -> Result<usize> {
    for view in views {
        view.spec.check_bindings(&view.table)?;
        presenter.present(view)?;
        metrics::record(MetricName::ViewsPresented, 1);
    }
    Ok(views.len())
}

/// Writes each view's title and table as text
pub struct TextPresenter<W: Write> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, view: &View) -> Result<()> {
        writeln!(self.out, "== {} ==", view.spec.title)?;
        if view.table.is_empty() {
            writeln!(self.out, "(no rows)")?;
        } else {
            write!(self.out, "{}", view.table)?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ChartDocument<'a> {
    generated_at: String,
    spec: &'a ChartSpec,
    table: &'a Frame,
}

/// Writes `<dir>/<slug>.json` per view, holding the spec and its table
pub struct JsonPresenter {
    dir: PathBuf,
}

impl JsonPresenter {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, view: &View) -> PathBuf {
        self.dir.join(format!("{}.json", view.slug))
    }
}

impl Presenter for JsonPresenter {
    #[instrument(skip_all, fields(view = %view.slug))]
    fn present(&mut self, view: &View) -> Result<()> {
        let doc = ChartDocument {
            generated_at: Utc::now().to_rfc3339(),
            spec: &view.spec,
            table: &view.table,
        };
        let path = self.path_for(view);
        let body = serde_json::to_string_pretty(&doc)?;
        fs::write(&path, body)?;
        debug!("Wrote {} rows to {}", view.table.len(), path.display());
        if view.table.is_empty() {
            info!("View '{}' has no rows", view.slug);
        }
        Ok(())
    }
}
