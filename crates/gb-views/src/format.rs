//! Display formatting helpers

/// Format an amount with space-separated thousands and a ruble sign
pub fn format_money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    grouped.push_str(" ₽");
    grouped
}

/// Cut text to `max_chars` characters, appending `...` when shortened
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Russian plural of "проект" for a count
pub fn projects_label(count: usize) -> String {
    let word = match (count % 10, count % 100) {
        (1, n) if n != 11 => "проект",
        (2..=4, n) if !(12..=14).contains(&n) => "проекта",
        _ => "проектов",
    };
    format!("{} {}", count, word)
}
