use regex::Regex;

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".webp", ".gif"];

/// Filename for the item at the given 1-based position. The batch always
/// names files by position with a fixed extension, not by the source name.
pub fn filename_for(position: usize) -> String {
    format!("photo-{}.jpg", position)
}

/// True if the path or URL points at an image. Query strings and fragments
/// are ignored; Cloudinary delivery URLs are accepted even without an
/// extension.
pub fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let lower = path.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) || lower.contains("/image/upload/")
}

/// Pull image sources out of result-page markup, in document order.
pub fn extract_image_urls(html: &str) -> Vec<String> {
    // Matches src="..." inside img tags
    let re = match Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    re.captures_iter(html)
        .map(|caps| caps[1].to_string())
        .filter(|src| is_image_url(src))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_for() {
        assert_eq!(filename_for(1), "photo-1.jpg");
        assert_eq!(filename_for(12), "photo-12.jpg");
    }

    #[test]
    fn test_is_image_url() {
        assert!(is_image_url("/media/photos/abc.JPG"));
        assert!(is_image_url("https://example.com/x.png?w=400#top"));
        assert!(is_image_url(
            "https://res.cloudinary.com/demo/image/upload/v1/events/abc"
        ));
        assert!(!is_image_url("/static/js/main.js"));
    }

    #[test]
    fn test_extract_image_urls() {
        let html = r#"
            <div class="result-card">
                <img class="result-image" src="/media/photos/1.jpg" alt="">
            </div>
            <img src='https://cdn.example.com/2.png'>
            <img src="/static/icons/logo.svg">
        "#;
        let urls = extract_image_urls(html);
        assert_eq!(
            urls,
            vec![
                "/media/photos/1.jpg".to_string(),
                "https://cdn.example.com/2.png".to_string(),
            ]
        );
    }
}
