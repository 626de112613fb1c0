use once_cell::sync::Lazy;
use regex::Regex;

/// Report images published by the IP and network quality checks.
const REPORT_IMAGE_PATTERN: &str = r"https?://Report\.Check\.Place/(?:ip|net)/[A-Za-z0-9]+\.svg";

static REPORT_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(REPORT_IMAGE_PATTERN).unwrap());

static REPORT_IMAGE_EXACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{REPORT_IMAGE_PATTERN}$")).unwrap());

/// Collect report image URLs in first-seen order, without duplicates.
pub fn extract_links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for found in REPORT_IMAGE.find_iter(text) {
        if !links.iter().any(|link| link == found.as_str()) {
            links.push(found.as_str().to_owned());
        }
    }
    links
}

/// Whether `url` is exactly one report image URL.
///
/// This is the allow-list a proxy for these images has to enforce; it does
/// not check that the image exists.
pub fn is_report_image_url(url: &str) -> bool {
    REPORT_IMAGE_EXACT.is_match(url)
}
