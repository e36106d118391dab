/// Average reading speed used for `readingTime`.
pub const WORDS_PER_MINUTE: usize = 200;

/// Filesystem-safe name for a downloaded asset.
///
/// Keeps word characters, `.` and `-`; whitespace/hyphen runs become a single
/// `-`; the result is lowercased and stripped of edge `-` and `.`.
pub fn sanitize_filename(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if is_word_char(c) || c == '.' {
            if pending_dash {
                out.push('-');
                pending_dash = false;
            }
            out.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }
    out.trim_matches(&['-', '.'][..]).to_string()
}

/// URL slug for a post title.
///
/// Turkish letters fold to their ASCII base, anything outside `[a-z0-9]`,
/// whitespace and `-` is dropped, and separators collapse to single hyphens.
/// `generate_slug(generate_slug(x)) == generate_slug(x)` for every input.
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut prev_dash = false;
    for c in lowered.chars().map(fold_turkish) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            prev_dash = false;
        } else if c.is_whitespace() || c == '-' {
            if !prev_dash {
                slug.push('-');
            }
            prev_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}

/// Whole minutes needed to read `text`, never less than one.
pub fn calculate_reading_time(text: &str) -> u32 {
    let words = count_words(text);
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Truncates to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((end, _)) => input[..end].to_string(),
        None => input.to_string(),
    }
}

fn count_words(text: &str) -> usize {
    let mut words = 0;
    let mut in_word = false;
    for c in text.chars() {
        let word = is_word_char(c);
        if word && !in_word {
            words += 1;
        }
        in_word = word;
    }
    words
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn fold_turkish(c: char) -> char {
    match c {
        'ğ' => 'g',
        'ü' => 'u',
        'ş' => 's',
        'ı' => 'i',
        'ö' => 'o',
        'ç' => 'c',
        other => other,
    }
}
