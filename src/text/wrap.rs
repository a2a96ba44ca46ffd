use crate::text::face::Typeface;

/// Placeholder used for blank paragraphs so vertical spacing is kept.
pub const BLANK_LINE: &str = " ";

/// Greedy word wrap of `text` into display lines no wider than `max_width` pixels.
///
/// Hard line breaks (`\n`, `\r\n`, `\r`) always split paragraphs. Blank paragraphs become a
/// single [`BLANK_LINE`]. A word wider than `max_width` is placed alone on its line, unsplit.
/// Never returns an empty vector.
pub fn wrap_text(text: &str, max_width: u32, face: &dyn Typeface) -> Vec<String> {
    wrap_with(text, max_width, |s| face.measure(s))
}

/// [`wrap_text`] with an arbitrary width function.
pub fn wrap_with(text: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();

    for paragraph in normalized.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(BLANK_LINE.to_owned());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };

            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = word.to_owned();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(BLANK_LINE.to_owned());
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
