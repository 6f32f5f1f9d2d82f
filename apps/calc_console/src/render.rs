use calc_core::{bits, HistoryStore};
use shared::domain::{Mode, Radix};

const WIDTH: usize = 32;

/// Expression line above the display, both right-aligned.
pub fn status(expression: &str, display: &str) -> String {
    format!("{expression:>width$}\n{display:>width$}", width = WIDTH)
}

pub fn mode_line(mode: Mode, radix: Radix) -> String {
    format!("[{mode} {}]", radix.label())
}

/// Sixty-four bits, most significant first, one row of sixteen per line
/// labelled with the index of its leftmost bit.
pub fn bit_panel(pattern: u64) -> String {
    bits::panel_rows(pattern)
        .iter()
        .enumerate()
        .map(|(row, groups)| {
            let nibbles: Vec<String> = groups
                .iter()
                .map(|nibble| nibble.iter().map(|&set| if set { '1' } else { '0' }).collect())
                .collect();
            format!("{:>2}  {}", 63 - row * 16, nibbles.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Newest entry first, numbered from 1 for `:reenter`.
pub fn history_listing(history: &HistoryStore) -> String {
    if history.is_empty() {
        return "(no history)".to_string();
    }
    history
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{:>3}  {} = {}", i + 1, item.expression(), item.result()))
        .collect::<Vec<_>>()
        .join("\n")
}
