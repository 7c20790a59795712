use prefbench_core::WinTally;

/// Single-line preview of model output for progress logs.
pub fn preview(s: &str, max_chars: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_chars {
        s
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Print win counts and rates as a table on stdout.
pub fn print_tally(title: &str, tally: &WinTally, abandoned: Option<usize>) {
    let w = 52;
    println!();
    println!("{title}");
    println!("{}", "\u{2550}".repeat(w));
    println!("{:<28} {:>10} {:>12}", "Outcome", "Count", "Rate");
    println!("{}", "\u{2500}".repeat(w));

    let total = tally.total();
    let rates = tally.rates();
    for (label, count, rate) in [
        ("Full History", tally.full_history, rates.full_history),
        ("Summarized History", tally.summarized_history, rates.summarized_history),
        ("Tie", tally.tie, rates.tie),
    ] {
        println!("{label:<28} {count:>10} {:>12}", format!("{rate:.2}%"));
    }

    println!("{}", "\u{2500}".repeat(w));
    println!("{:<28} {:>10}", "Recorded topics", total);
    if let Some(n) = abandoned {
        println!("{:<28} {:>10}", "Abandoned topics", n);
    }
    println!("{}", "\u{2550}".repeat(w));
    if total == 0 {
        println!("No successful experiments to calculate win rates.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("hello", 50), "hello");
    }

    #[test]
    fn test_preview_truncates_and_flattens() {
        assert_eq!(preview("line one\nline two", 8), "line one...");
    }

    #[test]
    fn test_preview_char_boundary_safe() {
        assert_eq!(preview("ééééé", 2), "éé...");
    }
}
