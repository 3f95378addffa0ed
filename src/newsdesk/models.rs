//! Entity records stored in Postgres.
//!
//! JSON field names match the site frontend (camelCase); column names are
//! snake_case. Bodies may omit fields, which default to empty values, so the
//! handlers validate the few required fields explicitly.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: String,
    pub category: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: String,
    pub read_time: String,
    pub image: String,
    pub content: String,
    pub sidenote: String,
    pub language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Headline {
    pub id: String,
    pub title: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Photo {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image_url: String,
    pub date: String,
    pub location: String,
    pub description: String,
    pub dispatch_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct ImpactStat {
    pub id: String,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub icon: String,
    pub stats: String,
    pub color: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalEvent {
    pub id: String,
    pub location: String,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineItem {
    pub id: String,
    pub year: String,
    pub title: String,
    pub event: String,
    pub ref_id: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct ArchiveBook {
    pub id: String,
    pub title: String,
    pub author: String,
    pub image: String,
    pub reflection: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalAnchor {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Advertisement {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub link_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_active: bool,
    pub position: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Perspective {
    pub id: String,
    pub article_id: String,
    pub name: String,
    pub email: String,
    pub content: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub category: String,
    pub message: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutConfig {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub quote: String,
    pub image: String,
    pub badge: String,
    pub stat1_label: String,
    pub stat1_value: String,
    pub stat2_label: String,
    pub stat2_value: String,
    pub stat3_label: String,
    pub stat3_value: String,
    pub stat4_label: String,
    pub stat4_value: String,
    pub impact_section_link: String,
    pub global_anchors_link: String,
    pub global_anchors_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationConfig {
    pub id: String,
    pub qr_code_url: String,
    pub upi_id: String,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub swift_code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn article_json_field_names_are_camel_case() -> Result<()> {
        let article = Article {
            id: "art-1".to_string(),
            read_time: "4 min".to_string(),
            ..Article::default()
        };
        let value = serde_json::to_value(article)?;
        assert_eq!(value["readTime"], "4 min");
        assert!(value.get("read_time").is_none());
        Ok(())
    }

    #[test]
    fn impact_stat_uses_legacy_short_names() -> Result<()> {
        let stat: ImpactStat = serde_json::from_str(
            r#"{"id":"imp-1","title":"Reach","desc":"Readers","ref":"r1"}"#,
        )?;
        assert_eq!(stat.description, "Readers");
        assert_eq!(stat.reference, "r1");
        Ok(())
    }

    #[test]
    fn advertisement_type_field_round_trips() -> Result<()> {
        let ad: Advertisement =
            serde_json::from_str(r#"{"id":"ad-1","type":"sidebar","isActive":true}"#)?;
        assert_eq!(ad.kind, "sidebar");
        assert!(ad.is_active);
        let value = serde_json::to_value(ad)?;
        assert_eq!(value["type"], "sidebar");
        Ok(())
    }

    #[test]
    fn partial_bodies_fill_defaults() -> Result<()> {
        let headline: Headline = serde_json::from_str(r#"{"title":"Breaking"}"#)?;
        assert_eq!(headline.id, "");
        assert_eq!(headline.time, "");
        Ok(())
    }
}
