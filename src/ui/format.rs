/// Short tick/label text: 950, 1.5k, 2.3M, -4.1B.
pub fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "k")
    } else {
        (value, "")
    };

    if suffix.is_empty() {
        if scaled.fract() == 0.0 {
            format!("{:.0}", scaled)
        } else {
            format!("{:.2}", scaled)
        }
    } else if scaled.fract() == 0.0 {
        format!("{:.0}{}", scaled, suffix)
    } else {
        format!("{:.1}{}", scaled, suffix)
    }
}

/// Thousands-separated integer, for the slider read-out.
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
