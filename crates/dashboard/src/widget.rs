//! Abstract widget tree produced by the views.
//!
//! Views never touch a concrete UI toolkit. They build a [`Widget`] tree whose
//! clickable nodes carry the [`DashboardEvent`] to dispatch; a host (the HTML
//! renderer, or a test) walks the tree.

use crate::event::DashboardEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Panel,
    Heading,
    Text,
    Label,
    Badge,
    Button,
    List,
    Item,
    Table,
    Row,
    HeaderCell,
    Cell,
    /// Horizontal bar filled to `percent` (0-100)
    Meter { percent: f64 },
    /// Mount point for a chart created through the chart backend
    Chart { container: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub kind: WidgetKind,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub children: Vec<Widget>,
    pub action: Option<DashboardEvent>,
    pub disabled: bool,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            classes: Vec::new(),
            text: None,
            children: Vec::new(),
            action: None,
            disabled: false,
        }
    }

    pub fn panel(class: &str) -> Self {
        Self::new(WidgetKind::Panel).with_class(class)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Heading).with_text(text)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Text).with_text(text)
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Label).with_text(text)
    }

    pub fn badge(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Badge).with_text(text)
    }

    pub fn button(text: impl Into<String>, action: DashboardEvent) -> Self {
        Self::new(WidgetKind::Button).with_text(text).on_click(action)
    }

    pub fn cell(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Cell).with_text(text)
    }

    pub fn meter(percent: f64) -> Self {
        Self::new(WidgetKind::Meter {
            percent: percent.clamp(0.0, 100.0),
        })
    }

    pub fn chart(container: &str) -> Self {
        Self::new(WidgetKind::Chart {
            container: container.to_string(),
        })
        .with_class("chart")
    }

    /// Muted text shown when a section has nothing to display
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::text(text).with_class("placeholder")
    }

    pub fn with_class(mut self, class: &str) -> Self {
        if !class.is_empty() {
            self.classes.push(class.to_string());
        }
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Widget) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Widget>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn on_click(mut self, action: DashboardEvent) -> Self {
        self.action = Some(action);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Depth-first search for every node carrying `class`
    pub fn find_all(&self, class: &str) -> Vec<&Widget> {
        let mut found = Vec::new();
        self.collect(&mut |w: &Widget| w.has_class(class), &mut found);
        found
    }

    pub fn find(&self, class: &str) -> Option<&Widget> {
        self.find_all(class).into_iter().next()
    }

    /// First node whose action equals `action`
    pub fn find_action(&self, action: &DashboardEvent) -> Option<&Widget> {
        let mut found = Vec::new();
        self.collect(&mut |w: &Widget| w.action.as_ref() == Some(action), &mut found);
        found.into_iter().next()
    }

    /// All text in the subtree, depth-first
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    fn collect<'a>(&'a self, pred: &mut dyn FnMut(&Widget) -> bool, out: &mut Vec<&'a Widget>) {
        if pred(self) {
            out.push(self);
        }
        for child in &self.children {
            child.collect(pred, out);
        }
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(text) = &self.text {
            out.push(text);
        }
        for child in &self.children {
            child.collect_texts(out);
        }
    }
}
