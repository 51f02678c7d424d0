//! Plotly-shaped figure descriptions. The page hands these to `Plotly.react`
//! as-is, so field names follow Plotly's JSON schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar(BarTrace),
    Pie(PieTrace),
    Scatter(ScatterTrace),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    /// Share of the population, shown on hover.
    pub customdata: Vec<f64>,
    pub hovertemplate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieTrace {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub hole: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub barmode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub annotations: Vec<Annotation>,
}

impl Layout {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Title::centered(text),
            barmode: None,
            xaxis: None,
            annotations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    pub xanchor: String,
    pub yanchor: String,
    pub x: f64,
    pub y: f64,
}

impl Title {
    pub fn centered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            xanchor: "center".to_string(),
            yanchor: "top".to_string(),
            x: 0.5,
            y: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub showarrow: bool,
    pub x: f64,
    pub y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_serialize_with_plotly_type_tag() {
        let trace = Trace::Pie(PieTrace {
            labels: vec!["HS".into()],
            values: vec![3.0],
            hole: 0.3,
        });
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["type"], "pie");
        assert_eq!(json["hole"], 0.3);
    }

    #[test]
    fn layout_omits_unset_fields() {
        let json = serde_json::to_value(Layout::titled("T")).unwrap();
        assert_eq!(json["title"]["text"], "T");
        assert_eq!(json["title"]["xanchor"], "center");
        assert!(json.get("barmode").is_none());
        assert!(json.get("annotations").is_none());
    }
}
