// src/markup.rs
//! Review card markup.
//!
//! Produces the opaque HTML payload a slide carries. The engine never looks
//! inside it.

use crate::content::Review;

const MAX_STARS: u8 = 5;

/// Escape text for use inside HTML element content and attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Whole stars: rating floored and clamped to 0..=5
pub fn star_count(rating: f64) -> u8 {
    if !rating.is_finite() {
        return MAX_STARS;
    }
    rating.floor().clamp(0.0, MAX_STARS as f64) as u8
}

pub fn star_row(rating: f64) -> String {
    let filled = star_count(rating) as usize;
    let empty = MAX_STARS as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

/// Avatar initials: first and last word, or the first two letters of a
/// single word. Nameless reviewers get "RV".
pub fn reviewer_initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let initials: String = match words.as_slice() {
        [] => return "RV".to_string(),
        [only] => only.chars().take(2).collect(),
        [first, .., last] => first.chars().take(1).chain(last.chars().take(1)).collect(),
    };
    initials.to_uppercase()
}

/// Lowercase slug for the avatar sprite lookup ("Mary-Jo O'Neil" -> "mary-jo-oneil")
pub fn reviewer_slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Render one review as a card fragment
pub fn render_review_card(review: &Review) -> String {
    let rating = review.rating();
    let stars = star_count(rating);
    let mut html = String::new();

    html.push_str("<article class=\"review-card\">");
    html.push_str("<header class=\"review-header\">");
    html.push_str(&format!(
        "<span class=\"reviewer-avatar\" data-reviewer=\"{}\" aria-hidden=\"true\">{}</span>",
        reviewer_slug(&review.reviewer_name),
        escape_html(&reviewer_initials(&review.reviewer_name))
    ));
    html.push_str(&format!(
        "<span class=\"reviewer-name\">{}</span>",
        escape_html(&review.reviewer_name)
    ));

    let mut badges = Vec::new();
    if review.is_local_guide {
        badges.push("<span class=\"badge badge-local-guide\">Local Guide</span>");
    }
    if review.is_verified {
        badges.push("<span class=\"badge badge-verified\">Verified</span>");
    }
    html.push_str(&badges.concat());
    html.push_str("</header>");

    html.push_str(&format!(
        "<div class=\"review-rating\" aria-label=\"{} out of {} stars\">{}</div>",
        stars,
        MAX_STARS,
        star_row(rating)
    ));
    html.push_str(&format!(
        "<p class=\"review-text\">{}</p>",
        escape_html(review.text())
    ));

    let mut meta = Vec::new();
    if let Some(date) = review.display_date() {
        meta.push(format!("<span class=\"review-date\">{}</span>", escape_html(date)));
    }
    let photos = review.photo_count();
    if photos > 0 {
        meta.push(format!(
            "<span class=\"review-photos\">{} {}</span>",
            photos,
            if photos == 1 { "photo" } else { "photos" }
        ));
    }
    let helpful = review.helpful_count();
    if helpful > 0 {
        meta.push(format!(
            "<span class=\"review-helpful\">{} found this helpful</span>",
            helpful
        ));
    }
    if !meta.is_empty() {
        html.push_str("<footer class=\"review-meta\">");
        html.push_str(&meta.concat());
        html.push_str("</footer>");
    }

    html.push_str("</article>");
    html
}

/// One-line plain text rendering, for terminals and logs
pub fn review_summary(review: &Review) -> String {
    let mut line = format!("{} {}", star_row(review.rating()), review.reviewer_name);
    if let Some(date) = review.display_date() {
        line.push_str(&format!(" ({})", date));
    }
    let text = review.text();
    if !text.is_empty() {
        line.push_str(": ");
        line.push_str(&truncate(text, 80));
    }
    line
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
