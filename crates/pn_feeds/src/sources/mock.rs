use chrono::{Duration, Utc};
use pn_core::{Article, ArticleSource, NewsResponse};

#[allow(clippy::too_many_arguments)]
fn mock_article(
    id: &str,
    source: (&str, &str),
    author: &str,
    title: &str,
    description: &str,
    hours_ago: i64,
    image: &str,
    content: &str,
    category: &str,
) -> Article {
    Article {
        id: id.to_string(),
        source: ArticleSource {
            id: Some(source.0.to_string()),
            name: source.1.to_string(),
        },
        author: Some(author.to_string()),
        title: title.to_string(),
        description: description.to_string(),
        url: format!("https://example.com/article-{}", id.trim_start_matches("mock-")),
        url_to_image: Some(image.to_string()),
        published_at: Utc::now() - Duration::hours(hours_ago),
        content: content.to_string(),
        category: Some(category.to_string()),
        country: None,
        saved: None,
    }
}

/// Fixed dataset served whenever the upstream source cannot be used. Ids are
/// stable so saved state survives across fetches.
pub fn mock_news() -> NewsResponse {
    NewsResponse::ok(vec![
        mock_article(
            "mock-1",
            ("bbc-news", "BBC News"),
            "BBC Staff",
            "Global Political Summit Concludes with Historic Agreement",
            "World leaders reach consensus on climate and economic policies after week-long negotiations.",
            0,
            "https://images.unsplash.com/photo-1523995462485-3d171b5c8fa9?w=800",
            "World leaders from over 50 countries concluded a historic summit today...",
            "politics",
        ),
        mock_article(
            "mock-2",
            ("cnn", "CNN"),
            "Jane Smith",
            "Senate Passes Major Infrastructure Bill",
            "Bipartisan legislation approved after months of debate and negotiations.",
            1,
            "https://images.unsplash.com/photo-1555374018-13a8994ab246?w=800",
            "The Senate voted 72-28 to approve a comprehensive infrastructure package...",
            "politics",
        ),
        mock_article(
            "mock-3",
            ("reuters", "Reuters"),
            "John Doe",
            "International Trade Agreement Signed",
            "Multiple nations commit to reducing trade barriers and promoting economic cooperation.",
            2,
            "https://images.unsplash.com/photo-1526304640581-d334cdbbf45e?w=800",
            "Representatives from various countries signed a landmark trade agreement today...",
            "business",
        ),
    ])
}
