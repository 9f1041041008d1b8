//! Static fallback datasets served when a read endpoint is unreachable.
//!
//! One fixed set per endpoint so collection views always render
//! something and tests can assert exact content. Items mirror the
//! backend's own demo data.

use chrono::{NaiveDate, NaiveDateTime};

use crate::api::models::{Category, LiveStatus, NewsArticle, Video};

const CHANNEL_TITLE: &str = "LCA TV";

fn video(
    id: &str,
    title: &str,
    description: &str,
    published_at: &str,
    category: &str,
    view_count: &str,
    like_count: &str,
    duration: &str,
) -> Video {
    Video {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        thumbnail: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
        published_at: published_at.to_string(),
        category: category.to_string(),
        view_count: view_count.to_string(),
        like_count: like_count.to_string(),
        duration: Some(duration.to_string()),
        channel_title: CHANNEL_TITLE.to_string(),
    }
}

pub fn videos() -> Vec<Video> {
    vec![
        video(
            "eSApphrRKWg",
            "Journal LCA TV - Édition du Soir",
            "Retrouvez l'actualité nationale et internationale du Burkina Faso.",
            "2024-12-15T19:00:00Z",
            "actualites",
            "15420",
            "234",
            "25:30",
        ),
        video(
            "xJatmbxIaIM",
            "Franc-Parler - Débat Économie",
            "Débat sur les enjeux économiques du Burkina Faso.",
            "2024-12-14T20:30:00Z",
            "debats",
            "8750",
            "156",
            "45:12",
        ),
        video(
            "8aIAKRe4Spo",
            "Festival des Masques - Culture Burkinabè",
            "Découvrez la richesse culturelle du Burkina Faso à travers le festival des masques.",
            "2024-12-13T18:00:00Z",
            "culture",
            "12300",
            "298",
            "35:45",
        ),
        video(
            "R2EocmxeJ5Q",
            "Étalons du Burkina - Match Analysis",
            "Analyse du dernier match des Étalons du Burkina Faso.",
            "2024-12-12T21:00:00Z",
            "sport",
            "25600",
            "567",
            "52:18",
        ),
        video(
            "pMlWnB5Wj3Q",
            "Jeunesse Avenir - Entrepreneuriat",
            "Émission dédiée aux jeunes entrepreneurs du Burkina Faso.",
            "2024-12-11T17:30:00Z",
            "jeunesse",
            "6890",
            "134",
            "30:22",
        ),
        video(
            "ixQEmhTbvTI",
            "Questions de Femmes - Édition Spéciale",
            "Émission spéciale dédiée aux femmes entrepreneures.",
            "2024-12-10T16:00:00Z",
            "femmes",
            "9450",
            "187",
            "28:15",
        ),
    ]
}

pub fn videos_in_category(category: &str) -> Vec<Video> {
    videos()
        .into_iter()
        .filter(|v| v.category == category)
        .collect()
}

pub fn video_by_id(id: &str) -> Option<Video> {
    videos().into_iter().find(|v| v.id == id)
}

fn published(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .unwrap_or_default()
}

pub fn news() -> Vec<NewsArticle> {
    vec![
        NewsArticle {
            id: "news-national-flash".to_string(),
            title: "Actualités nationales - Flash info du jour".to_string(),
            content: "Les dernières nouvelles du Burkina Faso. Point sur la situation politique et économique du pays...".to_string(),
            excerpt: "Flash info: Point sur l'actualité nationale et internationale du Burkina Faso.".to_string(),
            image_url: Some("https://via.placeholder.com/400x300?text=Breaking+News+LCA+TV".to_string()),
            category: "national".to_string(),
            published_at: published(2024, 12, 15, 8, 0),
            author: CHANNEL_TITLE.to_string(),
        },
        NewsArticle {
            id: "news-sport-etalons".to_string(),
            title: "Sport - Étalons du Burkina en préparation".to_string(),
            content: "L'équipe nationale se prépare pour les prochaines échéances internationales...".to_string(),
            excerpt: "Les Étalons du Burkina Faso continuent leur préparation pour les prochains matches.".to_string(),
            image_url: Some("https://via.placeholder.com/400x300?text=Sport+LCA+TV".to_string()),
            category: "sport".to_string(),
            published_at: published(2024, 12, 15, 6, 0),
            author: CHANNEL_TITLE.to_string(),
        },
        NewsArticle {
            id: "news-culture-danse".to_string(),
            title: "Culture - Festival de danse traditionnelle".to_string(),
            content: "Le festival annuel de danse traditionnelle met en valeur la culture burkinabè...".to_string(),
            excerpt: "Découvrez les temps forts du festival de danse traditionnelle organisé à Ouagadougou.".to_string(),
            image_url: Some("https://via.placeholder.com/400x300?text=Culture+LCA+TV".to_string()),
            category: "culture".to_string(),
            published_at: published(2024, 12, 15, 3, 0),
            author: CHANNEL_TITLE.to_string(),
        },
    ]
}

pub fn article_by_id(id: &str) -> Option<NewsArticle> {
    news().into_iter().find(|article| article.id == id)
}

pub fn news_in_category(category: &str) -> Vec<NewsArticle> {
    news()
        .into_iter()
        .filter(|article| article.category == category)
        .collect()
}

fn category(id: &str, name: &str, icon: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
    }
}

pub fn categories() -> Vec<Category> {
    vec![
        category("actualites", "📰 Actualités", "newspaper"),
        category("debats", "🗣️ Franc-Parler", "chatbubbles"),
        category("femmes", "🎭 Questions de Femmes", "woman"),
        category("culture", "🌍 Soleil d'Afrique", "sunny"),
        category("sport", "⚽ Sports & Étalons", "football"),
        category("jeunesse", "👥 Jeunesse Avenir", "people"),
        category("national", "🇧🇫 Burkina Faso", "flag"),
        category("musique", "🎪 Danse des Masques", "musical-notes"),
    ]
}

pub fn live_status() -> LiveStatus {
    LiveStatus {
        is_live: true,
        stream_url: "https://www.youtube.com/watch?v=ixQEmhTbvTI".to_string(),
        title: "LCA TV - Direct".to_string(),
        viewers: 1250,
        started_at: "2024-01-15T08:00:00Z".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_ids_are_unique() {
        let mut ids: Vec<_> = videos().into_iter().map(|v| v.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn category_filter_matches_backend_keys() {
        let sport = videos_in_category("sport");
        assert_eq!(sport.len(), 1);
        assert_eq!(sport[0].id, "R2EocmxeJ5Q");
        assert!(videos_in_category("telenovela").is_empty());
    }

    #[test]
    fn every_video_category_is_a_known_category() {
        let known: Vec<_> = categories().into_iter().map(|c| c.id).collect();
        for video in videos() {
            assert!(known.contains(&video.category), "{}", video.category);
        }
    }
}
