//! Chart capability consumed by the views.
//!
//! Views describe a chart with [`ChartOptions`] and hand it to a
//! [`ChartRegistry`], which creates a chart per container on first use and
//! replaces the whole option set on every later render.

use serde::Serialize;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YAxis {
    pub name: Option<String>,
    /// Draw the smallest value at the top (used for ranks)
    pub inverse: bool,
    pub min: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<f64>,
}

/// Declarative description of a line chart
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartOptions {
    pub title: Option<String>,
    pub x_axis: Vec<String>,
    pub y_axis: YAxis,
    pub series: Vec<ChartSeries>,
    pub legend: bool,
}

impl ChartOptions {
    pub fn series_named(&self, name: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Option object in the shape ECharts' `setOption` expects.
    pub fn to_echarts(&self) -> Value {
        let mut y_axis = json!({ "type": "value", "inverse": self.y_axis.inverse });
        if let Some(name) = &self.y_axis.name {
            y_axis["name"] = json!(name);
        }
        if let Some(min) = self.y_axis.min {
            y_axis["min"] = json!(min);
        }

        let mut option = json!({
            "tooltip": { "trigger": "axis" },
            "xAxis": { "type": "category", "data": self.x_axis },
            "yAxis": y_axis,
            "series": self.series.iter().map(|s| json!({
                "name": s.name,
                "type": "line",
                "data": s.data,
            })).collect::<Vec<_>>(),
        });
        if let Some(title) = &self.title {
            option["title"] = json!({ "text": title });
        }
        if self.legend {
            option["legend"] = json!({ "data": self.series.iter().map(|s| &s.name).collect::<Vec<_>>() });
        }
        option
    }
}

/// A live chart instance
pub trait ChartHandle {
    fn set_option(&mut self, options: &ChartOptions, replace: bool);
    fn resize(&mut self);
}

/// Creates chart instances inside named containers
pub trait ChartBackend {
    fn init(&mut self, container: &str) -> Box<dyn ChartHandle>;
}

/// Lazily created charts, keyed by container
pub struct ChartRegistry {
    backend: Box<dyn ChartBackend>,
    charts: BTreeMap<String, Box<dyn ChartHandle>>,
}

impl ChartRegistry {
    pub fn new(backend: Box<dyn ChartBackend>) -> Self {
        Self {
            backend,
            charts: BTreeMap::new(),
        }
    }

    /// Replace the options of the chart in `container`, creating it first if
    /// this is the first render.
    pub fn render(&mut self, container: &str, options: &ChartOptions) {
        let backend = &mut self.backend;
        let chart = self
            .charts
            .entry(container.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating chart in #{}", container);
                backend.init(container)
            });
        chart.set_option(options, true);
    }

    /// Resize every chart created so far.
    pub fn resize_all(&mut self) {
        for chart in self.charts.values_mut() {
            chart.resize();
        }
    }

    pub fn contains(&self, container: &str) -> bool {
        self.charts.contains_key(container)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

/// What a [`MemoryChartBackend`] saw for one container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartRecord {
    pub options: Option<ChartOptions>,
    pub inits: usize,
    pub updates: usize,
    pub resizes: usize,
    pub last_replace: bool,
}

type ChartStore = Rc<RefCell<BTreeMap<String, ChartRecord>>>;

/// Backend that keeps the latest options per container in memory.
///
/// Used by the static HTML renderer and by tests. Clones share one store.
#[derive(Clone, Default)]
pub struct MemoryChartBackend {
    store: ChartStore,
}

impl MemoryChartBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, container: &str) -> Option<ChartRecord> {
        self.store.borrow().get(container).cloned()
    }

    pub fn options(&self, container: &str) -> Option<ChartOptions> {
        self.record(container).and_then(|r| r.options)
    }

    pub fn containers(&self) -> Vec<String> {
        self.store.borrow().keys().cloned().collect()
    }
}

impl ChartBackend for MemoryChartBackend {
    fn init(&mut self, container: &str) -> Box<dyn ChartHandle> {
        self.store
            .borrow_mut()
            .entry(container.to_string())
            .or_default()
            .inits += 1;
        Box::new(MemoryChart {
            container: container.to_string(),
            store: Rc::clone(&self.store),
        })
    }
}

struct MemoryChart {
    container: String,
    store: ChartStore,
}

impl ChartHandle for MemoryChart {
    fn set_option(&mut self, options: &ChartOptions, replace: bool) {
        let mut store = self.store.borrow_mut();
        let record = store.entry(self.container.clone()).or_default();
        record.options = Some(options.clone());
        record.updates += 1;
        record.last_replace = replace;
    }

    fn resize(&mut self) {
        self.store
            .borrow_mut()
            .entry(self.container.clone())
            .or_default()
            .resizes += 1;
    }
}
