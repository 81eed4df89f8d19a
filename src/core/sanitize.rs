// src/core/sanitize.rs

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Filesystem-safe stem from a human label. Keeps letters (accents too), digits, `-` and `_`;
/// whitespace runs become one `_`; everything else is dropped.
pub fn sanitize_filename(label: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut last_us = false;
    for ch in label.chars() {
        if ch.is_alphanumeric() { out.push(ch); last_us = false; }
        else if ch.is_whitespace() { if !last_us { out.push('_'); last_us = true; } }
        else if ch == '-' || ch == '_' { if !(last_us && ch == '_') { out.push(ch); } last_us = ch == '_'; }
    }
    let out = out.trim_matches('_').to_string();
    if out.is_empty() { s!(fallback) } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_ws_collapses_and_trims() {
        assert_eq!(normalize_ws("  São \n\t Paulo  "), "São Paulo");
    }

    #[test]
    fn sanitize_keeps_accents_and_drops_punctuation() {
        assert_eq!(sanitize_filename("São Paulo / 2022 Q1", "x"), "São_Paulo_2022_Q1");
        assert_eq!(sanitize_filename("Pré-natal (6 consultas)", "x"), "Pré-natal_6_consultas");
    }

    #[test]
    fn sanitize_falls_back_when_empty() {
        assert_eq!(sanitize_filename(" ?! ", "export_3"), "export_3");
    }
}
