use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `exercises` catalog.
///
/// The catalog is reference data owned by an external loader; this crate
/// only reads it. JSON field names match the column names so API consumers
/// see the same keys as the table.
///
/// The optional columns are only selected by the detail lookup. When a query
/// leaves them out they decode as `None` and are omitted from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(rename = "bodypart")]
    #[sqlx(rename = "bodypart")]
    pub body_part: String,
    pub target: String,
    pub equipment: String,
    #[serde(
        rename = "othermuscleslist",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    #[sqlx(rename = "othermuscleslist", default)]
    pub other_muscles: Option<Vec<String>>,
    #[serde(
        rename = "instructionslist",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    #[sqlx(rename = "instructionslist", default)]
    pub instructions: Option<Vec<String>>,
    #[serde(rename = "gifurl", default, skip_serializing_if = "Option::is_none")]
    #[sqlx(rename = "gifurl", default)]
    pub gif_url: Option<String>,
    #[serde(rename = "gifid", default, skip_serializing_if = "Option::is_none")]
    #[sqlx(rename = "gifid", default)]
    pub gif_id: Option<String>,
}

impl Exercise {
    /// The muscle this exercise is listed under: its target, or its body
    /// part when the target is blank.
    pub fn focus(&self) -> &str {
        if self.target.trim().is_empty() {
            &self.body_part
        } else {
            &self.target
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_up() -> Exercise {
        Exercise {
            id: "0662".to_owned(),
            name: "push-up".to_owned(),
            body_part: "chest".to_owned(),
            target: "pectorals".to_owned(),
            equipment: "body weight".to_owned(),
            other_muscles: None,
            instructions: None,
            gif_url: None,
            gif_id: None,
        }
    }

    #[test]
    fn serializes_with_column_names() {
        let json = serde_json::to_value(push_up()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "0662",
                "name": "push-up",
                "bodypart": "chest",
                "target": "pectorals",
                "equipment": "body weight",
            })
        );
    }

    #[test]
    fn serializes_detail_columns_when_present() {
        let mut ex = push_up();
        ex.other_muscles = Some(vec!["triceps".to_owned()]);
        ex.gif_id = Some("abc".to_owned());
        let json = serde_json::to_value(ex).unwrap();
        assert_eq!(json["othermuscleslist"], serde_json::json!(["triceps"]));
        assert_eq!(json["gifid"], "abc");
        assert!(json.get("gifurl").is_none());
    }

    #[test]
    fn focus_falls_back_to_body_part() {
        let mut ex = push_up();
        assert_eq!(ex.focus(), "pectorals");
        ex.target = String::new();
        assert_eq!(ex.focus(), "chest");
    }
}
