/// `round(part / total * 100)`. Returns 0 when `total` is 0.
pub fn pct(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Rounded arithmetic mean of a slice of counts. Returns 0 for empty input.
pub fn mean_rounded(values: &[usize]) -> usize {
    if values.is_empty() {
        return 0;
    }
    (values.iter().sum::<usize>() as f64 / values.len() as f64).round() as usize
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

pub fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// `(vowels, consonants)` over ASCII Latin letters only.
pub fn latin_letter_counts(text: &str) -> (usize, usize) {
    text.chars()
        .filter(char::is_ascii_alphabetic)
        .fold((0, 0), |(v, c), ch| {
            if matches!(ch.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u') {
                (v + 1, c)
            } else {
                (v, c + 1)
            }
        })
}
