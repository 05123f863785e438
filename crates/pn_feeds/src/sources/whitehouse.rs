use chrono::{Duration, Utc};
use pn_core::{WhiteHouseArticle, WhiteHouseKind};

const BRIEFING_ROOM: &str = "https://www.whitehouse.gov/briefing-room/";

/// Static White House updates.
#[derive(Debug, Clone, Default)]
pub struct WhiteHouseSource;

impl WhiteHouseSource {
    pub fn new() -> Self {
        Self
    }

    pub fn latest_updates(&self) -> Vec<WhiteHouseArticle> {
        let now = Utc::now();
        let stamp = now.timestamp_millis();
        let entry = |n: u32, kind, days_ago, title: &str, description: &str| WhiteHouseArticle {
            id: format!("wh-{}-{}", stamp, n),
            title: title.to_string(),
            description: description.to_string(),
            url: BRIEFING_ROOM.to_string(),
            published_at: now - Duration::days(days_ago),
            kind,
        };

        vec![
            entry(
                1,
                WhiteHouseKind::Statement,
                0,
                "Presidential Address on Economic Policy",
                "The President outlined new initiatives to strengthen the economy and support working families.",
            ),
            entry(
                2,
                WhiteHouseKind::Briefing,
                1,
                "Press Briefing on National Security",
                "White House Press Secretary provides updates on recent national security developments.",
            ),
            entry(
                3,
                WhiteHouseKind::PressRelease,
                2,
                "New Executive Order on Climate Change",
                "Administration announces comprehensive plan to address environmental challenges.",
            ),
        ]
    }

    pub fn by_kind(&self, kind: WhiteHouseKind) -> Vec<WhiteHouseArticle> {
        self.latest_updates()
            .into_iter()
            .filter(|article| article.kind == kind)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_updates() {
        let updates = WhiteHouseSource::new().latest_updates();
        assert_eq!(updates.len(), 3);
        assert!(updates.iter().all(|a| a.id.starts_with("wh-") && !a.title.is_empty()));
    }

    #[test]
    fn test_filter_by_kind() {
        let source = WhiteHouseSource::new();
        for kind in [
            WhiteHouseKind::Briefing,
            WhiteHouseKind::Statement,
            WhiteHouseKind::PressRelease,
        ] {
            let updates = source.by_kind(kind);
            assert_eq!(updates.len(), 1);
            assert!(updates.iter().all(|a| a.kind == kind));
        }
    }
}
