//! Templates and boards as the list view sees them.

use crate::api::types::{DashboardRecord, Metric, TemplateRecord};
use serde::{Deserialize, Serialize};

const UNTITLED: &str = "Untitled";

/// First non-empty candidate, else "Untitled".
fn resolve_name<'a>(candidates: impl IntoIterator<Item = &'a Option<String>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(|name| name.trim())
        .find(|name| !name.is_empty())
        .unwrap_or(UNTITLED)
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Only the literal `"public"` is public; anything else, including a missing type, is private.
    pub fn from_kind(kind: &str) -> Self {
        if kind == "public" {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub metrics: Vec<Metric>,
}

impl From<TemplateRecord> for Template {
    fn from(record: TemplateRecord) -> Self {
        let name = resolve_name([&record.template_name, &record.dashboard_name, &record.name]);
        let description = record
            .template_description
            .or(record.description)
            .unwrap_or_default();
        Self {
            id: record.id,
            name,
            description,
            metrics: record.metrics_list,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
    pub owner: String,
    pub modified: String,
    pub metrics: Vec<Metric>,
    /// Ids of the board's metrics, present even when `metrics` was not expanded.
    pub metric_ids: Vec<u64>,
}

impl From<DashboardRecord> for Board {
    fn from(record: DashboardRecord) -> Self {
        let name = resolve_name([&record.dashboard_name, &record.name]);
        let description = record
            .dashboard_description
            .or(record.description)
            .unwrap_or_default();
        Self {
            id: record.id,
            name,
            description,
            visibility: Visibility::from_kind(&record.kind),
            owner: record.user_name,
            modified: record.modified_date,
            metrics: record.metrics_list,
            metric_ids: record.metrics,
        }
    }
}

/// Either kind of list entry, with its name already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayItem {
    Template(Template),
    Board(Board),
}

impl DisplayItem {
    pub fn id(&self) -> u64 {
        match self {
            DisplayItem::Template(t) => t.id,
            DisplayItem::Board(b) => b.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            DisplayItem::Template(t) => &t.name,
            DisplayItem::Board(b) => &b.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            DisplayItem::Template(t) => &t.description,
            DisplayItem::Board(b) => &b.description,
        }
    }

    pub fn metrics(&self) -> &[Metric] {
        match self {
            DisplayItem::Template(t) => &t.metrics,
            DisplayItem::Board(b) => &b.metrics,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            DisplayItem::Template(_) => "template",
            DisplayItem::Board(b) => match b.visibility {
                Visibility::Public => "public",
                Visibility::Private => "private",
            },
        }
    }

    /// Up to `limit` metric names, then `+N` for the rest.
    pub fn metric_pills(&self, limit: usize) -> Vec<String> {
        let metrics = self.metrics();
        let mut pills: Vec<String> = metrics
            .iter()
            .take(limit)
            .map(|m| {
                if m.metric_name.is_empty() {
                    "Metric".to_string()
                } else {
                    m.metric_name.clone()
                }
            })
            .collect();
        if metrics.len() > limit {
            pills.push(format!("+{}", metrics.len() - limit));
        }
        pills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_record(json: &str) -> TemplateRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn template_name_falls_back_in_order() {
        let t = Template::from(template_record(
            r#"{"id": 1, "templateName": "", "dashboardName": "Ops", "name": "other"}"#,
        ));
        assert_eq!(t.name, "Ops");

        let t = Template::from(template_record(r#"{"id": 2}"#));
        assert_eq!(t.name, "Untitled");
    }

    #[test]
    fn board_visibility_is_public_only_for_literal_type() {
        let public: DashboardRecord =
            serde_json::from_str(r#"{"id": 2, "dashboardName": "Ops", "type": "public"}"#).unwrap();
        let shared: DashboardRecord =
            serde_json::from_str(r#"{"id": 3, "name": "Mine", "type": "Public"}"#).unwrap();
        let untyped: DashboardRecord = serde_json::from_str(r#"{"id": 4}"#).unwrap();

        assert_eq!(Board::from(public).visibility, Visibility::Public);
        let shared = Board::from(shared);
        assert_eq!(shared.visibility, Visibility::Private);
        assert_eq!(shared.name, "Mine");
        assert_eq!(Board::from(untyped).visibility, Visibility::Private);
    }

    #[test]
    fn pills_collapse_after_limit() {
        let metric = |name: &str| Metric {
            id: 0,
            metric_name: name.to_string(),
            metric_key: String::new(),
            metric_table_key: String::new(),
            metric_description: String::new(),
            metric_category: String::new(),
            media_link: None,
            color: None,
            yaxis_suffix: None,
        };
        let item = DisplayItem::Template(Template {
            id: 1,
            name: "Sales".to_string(),
            description: String::new(),
            metrics: vec![metric("a"), metric(""), metric("c"), metric("d"), metric("e")],
        });
        assert_eq!(item.metric_pills(3), vec!["a", "Metric", "c", "+2"]);
    }

    #[test]
    fn display_item_serializes_with_kind_tag() {
        let item = DisplayItem::Board(Board {
            id: 9,
            name: "Ops".to_string(),
            description: String::new(),
            visibility: Visibility::Public,
            owner: String::new(),
            modified: String::new(),
            metrics: Vec::new(),
            metric_ids: vec![1],
        });
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["kind"], "board");
        assert_eq!(value["visibility"], "public");
        let back: DisplayItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
    }
}
