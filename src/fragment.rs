// src/fragment.rs
//! Hover affordances on an injected prediction.
//!
//! The service's fragment carries a `#flyontime-data` panel with a hidden
//! `.flyontime-tooltip` inside. Entering the panel shows the tooltip, leaving hides
//! it. The tooltip may hold a `#delay-chart` whose `data-shape`/`data-scale`
//! describe the delay distribution; drawing it is somebody else's job, we only read
//! the numbers and mark the chart as handled.

use crate::core::{Document, NodeId};

pub const PANEL_ID: &str = "flyontime-data";
pub const TOOLTIP_CLASS: &str = "flyontime-tooltip";
pub const CHART_ID: &str = "delay-chart";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartParams {
    pub shape: Option<f64>,
    pub scale: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affordances {
    pub panel: NodeId,
}

impl Affordances {
    /// The panel inside an injected fragment, if the service sent one.
    pub fn find(doc: &Document, target: NodeId) -> Option<Self> {
        doc.find_by_id(target, PANEL_ID).map(|panel| Affordances { panel })
    }

    pub fn tooltip(&self, doc: &Document) -> Option<NodeId> {
        doc.find_by_class(self.panel, TOOLTIP_CLASS)
    }

    /// Pointer entered the panel. Returns the chart parameters the first time
    /// the chart is shown, `None` afterwards.
    pub fn reveal(&self, doc: &mut Document) -> Option<ChartParams> {
        let tooltip = self.tooltip(doc)?;
        doc.set_style(tooltip, "display", "block");

        let chart = doc.find_by_id(tooltip, CHART_ID)?;
        if doc.attr(chart, "data-rendered").is_some() {
            return None;
        }
        let params = ChartParams {
            shape: parse_float(doc.attr(chart, "data-shape")),
            scale: parse_float(doc.attr(chart, "data-scale")),
        };
        doc.set_attr(chart, "data-rendered", "true");
        Some(params)
    }

    /// Pointer left the panel.
    pub fn conceal(&self, doc: &mut Document) {
        if let Some(tooltip) = self.tooltip(doc) {
            doc.set_style(tooltip, "display", "none");
        }
    }

    pub fn is_revealed(&self, doc: &Document) -> bool {
        self.tooltip(doc).is_some_and(|t| doc.style(t, "display").as_deref() == Some("block"))
    }

    /// Tooltip text, hidden or not.
    pub fn detail_text(&self, doc: &Document) -> String {
        self.tooltip(doc)
            .map(|t| crate::core::text::normalize_ws(&doc.text_content(t)))
            .unwrap_or_default()
    }
}

fn parse_float(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = r#"<div id="flyontime-data">82% on time
        <div class="flyontime-tooltip" style="display: none">Median delay 12 min
        <svg id="delay-chart" data-shape="1.4" data-scale="nope"></svg></div></div>"#;

    fn injected() -> (Document, NodeId) {
        let mut doc = Document::parse("<div id=target></div>");
        let target = doc.find_by_id(doc.root(), "target").unwrap();
        doc.set_inner_html(target, FRAGMENT);
        (doc, target)
    }

    #[test]
    fn reveal_then_conceal() {
        let (mut doc, target) = injected();
        let aff = Affordances::find(&doc, target).unwrap();
        assert!(!aff.is_revealed(&doc));

        let params = aff.reveal(&mut doc).unwrap();
        assert_eq!(params, ChartParams { shape: Some(1.4), scale: None });
        assert!(aff.is_revealed(&doc));

        // chart is handled once
        assert!(aff.reveal(&mut doc).is_none());
        assert!(aff.is_revealed(&doc));

        aff.conceal(&mut doc);
        assert!(!aff.is_revealed(&doc));
    }

    #[test]
    fn detail_text_reads_hidden_tooltip() {
        let (doc, target) = injected();
        let aff = Affordances::find(&doc, target).unwrap();
        assert_eq!(aff.detail_text(&doc), "Median delay 12 min");
    }

    #[test]
    fn plain_fragment_has_no_panel() {
        let mut doc = Document::parse("<div id=target></div>");
        let target = doc.find_by_id(doc.root(), "target").unwrap();
        doc.set_inner_html(target, "<b>82%</b>");
        assert!(Affordances::find(&doc, target).is_none());
    }
}
