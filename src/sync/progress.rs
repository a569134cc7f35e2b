use indicatif::ProgressStyle;

const FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Spinner shown while the group listing and the remote heads are fetched.
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m {wide_msg}")
        .unwrap()
        .tick_strings(FRAMES)
}

/// `[done/total]` counter over the repositories of the group; outcome lines
/// are printed above it.
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m [{pos}/{len}] {wide_msg}")
        .unwrap()
        .tick_strings(FRAMES)
}

/// Run summary (or group resolution) with no failed repository.
pub fn ok_style() -> ProgressStyle {
    finished_style("32", "✔")
}

/// Run summary with failed repositories, or a group that could not be listed.
pub fn err_style() -> ProgressStyle {
    finished_style("31", "✘")
}

fn finished_style(color: &str, mark: &str) -> ProgressStyle {
    ProgressStyle::with_template(&format!("\x1b[{color}m{mark}\x1b[0m {{wide_msg}}")).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressBar;

    #[test]
    fn summary_styles_render_the_message() {
        for style in [ok_style(), err_style()] {
            let pb = ProgressBar::hidden();
            pb.set_style(style);
            pb.finish_with_message("3 cloned, 1 failed");
            assert_eq!(pb.message(), "3 cloned, 1 failed");
        }
    }

    #[test]
    fn bar_counts_repositories() {
        let pb = ProgressBar::hidden().with_style(bar_style());
        pb.set_length(4);
        pb.inc(1);
        assert_eq!(pb.position(), 1);
        assert_eq!(pb.length(), Some(4));
    }
}
