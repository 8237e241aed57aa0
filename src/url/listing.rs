use crate::config::SiteConfig;
use crate::{HarvestError, UrlError};
use url::Url;

/// Characters a category may not contain, since they would change the
/// structure of the listing URL rather than its tag segment
const RESERVED_CATEGORY_CHARS: &[char] = &['/', '?', '#', '&'];

/// Validates a category string supplied by the user
///
/// Returns the trimmed category on success.
///
/// # Examples
///
/// ```
/// use tag_harvest::url::validate_category;
///
/// assert_eq!(validate_category("  ekonomi ").unwrap(), "ekonomi");
/// assert!(validate_category("").is_err());
/// assert!(validate_category("a/b").is_err());
/// ```
pub fn validate_category(category: &str) -> Result<String, HarvestError> {
    let trimmed = category.trim();

    if trimmed.is_empty() {
        return Err(HarvestError::InvalidCategory {
            category: category.to_string(),
            reason: "category cannot be empty".to_string(),
        });
    }

    if let Some(c) = trimmed.chars().find(|c| RESERVED_CATEGORY_CHARS.contains(c)) {
        return Err(HarvestError::InvalidCategory {
            category: category.to_string(),
            reason: format!("category cannot contain '{}'", c),
        });
    }

    Ok(trimmed.to_string())
}

/// Builds the URL of listing page `page` for `category`
///
/// The site's `listing-path` template is appended to its `base-url` with the
/// `{category}` and `{page}` placeholders filled in. Pages are numbered
/// from 1.
///
/// # Examples
///
/// ```
/// # use tag_harvest::config::SiteConfig;
/// use tag_harvest::url::listing_url;
///
/// # let site = SiteConfig {
/// #     name: "Kompas.com".to_string(),
/// #     base_url: "https://www.kompas.com".to_string(),
/// #     listing_path: "/tag/{category}?page={page}".to_string(),
/// #     list_selector: "a".to_string(),
/// #     content_selector: "p".to_string(),
/// #     date_selector: "time".to_string(),
/// #     title_selector: None,
/// # };
/// let url = listing_url(&site, "ekonomi", 3).unwrap();
/// assert_eq!(url.as_str(), "https://www.kompas.com/tag/ekonomi?page=3");
/// ```
pub fn listing_url(site: &SiteConfig, category: &str, page: u32) -> Result<Url, UrlError> {
    let path = site
        .listing_path
        .replace("{category}", category)
        .replace("{page}", &page.to_string());

    let base = site.base_url.trim_end_matches('/');
    let joined = if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    };

    let url = Url::parse(&joined).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(base_url: &str, listing_path: &str) -> SiteConfig {
        SiteConfig {
            name: "Example".to_string(),
            base_url: base_url.to_string(),
            listing_path: listing_path.to_string(),
            list_selector: "a".to_string(),
            content_selector: "p".to_string(),
            date_selector: "time".to_string(),
            title_selector: None,
        }
    }

    #[test]
    fn test_listing_url_sequence() {
        let site = site("https://www.kompas.com", "/tag/{category}?page={page}");
        for page in 1..=3 {
            let url = listing_url(&site, "politik", page).unwrap();
            assert_eq!(
                url.as_str(),
                format!("https://www.kompas.com/tag/politik?page={}", page)
            );
        }
    }

    #[test]
    fn test_listing_url_trailing_slash_base() {
        let site = site("https://news.example.com/", "/tag/{category}?page={page}");
        let url = listing_url(&site, "sport", 1).unwrap();
        assert_eq!(url.as_str(), "https://news.example.com/tag/sport?page=1");
    }

    #[test]
    fn test_listing_url_keeps_base_path() {
        let site = site("https://example.com/news", "topics/{category}/{page}");
        let url = listing_url(&site, "tech", 2).unwrap();
        assert_eq!(url.as_str(), "https://example.com/news/topics/tech/2");
    }

    #[test]
    fn test_listing_url_encodes_spaces() {
        let site = site("https://example.com", "/tag/{category}?page={page}");
        let url = listing_url(&site, "pemilu 2024", 1).unwrap();
        assert_eq!(url.as_str(), "https://example.com/tag/pemilu%202024?page=1");
    }

    #[test]
    fn test_validate_category() {
        assert_eq!(validate_category("ekonomi").unwrap(), "ekonomi");
        assert_eq!(validate_category("  bola\n").unwrap(), "bola");

        assert!(validate_category("   ").is_err());
        assert!(validate_category("a?b").is_err());
        assert!(validate_category("a#b").is_err());
        assert!(matches!(
            validate_category("x/y"),
            Err(HarvestError::InvalidCategory { .. })
        ));
    }
}
