use crate::constants::DRIVE_DOWNLOAD_BASE;
use once_cell::sync::Lazy;
use regex::Regex;

static FILE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("valid regex"));

/// Rewrite a Drive sharing link (`.../d/<id>/view`) into a direct-download URL.
/// Links without a `/d/<id>` segment are returned unchanged.
pub fn rewrite_share_link(link: &str) -> String {
    match FILE_ID.captures(link).and_then(|caps| caps.get(1)) {
        Some(id) => format!("{}{}", DRIVE_DOWNLOAD_BASE, id.as_str()),
        None => link.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharing_link_is_rewritten() {
        assert_eq!(
            rewrite_share_link("https://drive.google.com/file/d/1AbC_d-E9/view?usp=sharing"),
            "https://drive.google.com/uc?export=download&id=1AbC_d-E9"
        );
    }

    #[test]
    fn test_first_id_wins() {
        assert_eq!(
            rewrite_share_link("https://drive.google.com/file/d/first/d/second/"),
            "https://drive.google.com/uc?export=download&id=first"
        );
    }

    #[test]
    fn test_other_links_pass_through() {
        for link in [
            "https://example.com/img/face.png",
            "",
            "not a url",
            "https://drive.google.com/d/",
        ] {
            assert_eq!(rewrite_share_link(link), link);
        }
    }
}
