use colored::Colorize;
use jt_core::{Note, NoteStats};

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

pub fn subheader(title: &str) {
    println!("{}", title.bold());
}

pub fn hint(msg: &str) {
    println!("{} {}", "hint:".cyan().bold(), msg.dimmed());
}

pub fn info(msg: &str) {
    eprintln!("{} {}", "info:".blue().bold(), msg);
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

const PREVIEW_CHARS: usize = 60;

/// One line per note: marker, star, id, title, preview.
pub fn note_line(note: &Note, selected: bool) -> String {
    let marker = if selected { ">" } else { " " };
    let star = if note.is_favorite { "★" } else { " " };
    let preview = note.preview(PREVIEW_CHARS).replace('\n', " ");
    format!(
        "{} {} {:<6} {}  {}",
        marker,
        star.yellow(),
        note.id.as_str().dimmed(),
        note.title.bold(),
        preview.dimmed()
    )
}

pub fn note_list(notes: &[Note], selected: Option<&Note>) {
    if notes.is_empty() {
        hint("No notes yet. Create one to get started.");
        return;
    }
    for note in notes {
        let is_selected = selected.is_some_and(|s| s.id == note.id);
        println!("{}", note_line(note, is_selected));
    }
}

pub fn note_detail(note: &Note) {
    header(&note.title);
    println!("  id:        {}", note.id.as_str().cyan());
    println!(
        "  favorite:  {}",
        if note.is_favorite { "yes".green() } else { "no".dimmed() }
    );
    println!("  created:   {}", note.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(updated) = note.updated_at {
        println!("  updated:   {}", updated.format("%Y-%m-%d %H:%M"));
    }
    println!();
    if note.content.is_empty() {
        println!("{}", "(empty)".dimmed());
    } else {
        println!("{}", note.content);
    }
}

pub fn stats(stats: &NoteStats) {
    header("Note Statistics");
    if let Some(email) = &stats.user_email {
        println!("  account:   {}", email.cyan());
    }
    println!("  notes:     {}", stats.total_notes);
    println!("  favorites: {}", stats.favorite_notes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use testing::{note, note_with};

    #[test]
    fn test_header_does_not_panic() {
        header("Test Header");
    }

    #[test]
    fn test_messages_do_not_panic() {
        subheader("Test Subheader");
        hint("This is a hint");
        info("This is info");
        warn("This is a warning");
        error("This is an error");
        success("This is success");
    }

    #[test]
    fn test_note_line_marks_selection_and_favorite() {
        colored::control::set_override(false);
        let line = note_line(&note_with("7", "Groceries", "milk, eggs", true), true);
        assert!(line.starts_with("> ★"));
        assert!(line.contains("Groceries"));
        assert!(line.contains("milk, eggs"));

        let line = note_line(&note("8", "Plain"), false);
        assert!(line.starts_with("   "));
    }

    #[test]
    fn test_note_line_flattens_preview() {
        colored::control::set_override(false);
        let line = note_line(&note_with("1", "T", "a\nb", false), false);
        assert!(line.contains("a b"));
    }
}
