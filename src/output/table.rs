use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::genre::GenreMap;
use crate::parse::PLACEHOLDER;
use crate::records::{ProjectRecord, TalentListOption, TalentRecord};
use crate::session::Notice;

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

/// Truncate, flatten line breaks and left-align to exactly `width` columns.
fn cell(s: &str, width: usize) -> String {
    let flat = s.replace(['\n', '\t'], " ");
    let text = truncate(&flat, width);
    let pad = width.saturating_sub(UnicodeWidthStr::width(text.as_str()));
    format!("{text}{}", " ".repeat(pad))
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Print a notice to stderr so table output stays pipeable.
pub fn print_notice(notice: &Notice) {
    match notice {
        Notice::Found(_) => {}
        Notice::Empty(msg) => eprintln!("warning: {msg}"),
        Notice::Failed(msg) => eprintln!("error: {msg}"),
    }
}

/// Format project search results as a numbered table.
pub fn print_project_results(projects: &[ProjectRecord]) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }

    println!("{} project{}:\n", projects.len(), plural(projects.len()));

    println!(
        "  {} {} {} {} {} {}",
        cell("#", 5),
        cell("PROJECT", 30),
        cell("PRODUCT", 20),
        cell("GENRE", 12),
        cell("CONTACT", 12),
        "CREATED"
    );
    println!("  {}", "-".repeat(92));

    for (i, p) in projects.iter().enumerate() {
        println!(
            "  {} {} {} {} {} {}",
            cell(&(i + 1).to_string(), 5),
            cell(&p.name, 30),
            cell(&p.product_name, 20),
            cell(&p.genre_name, 12),
            cell(&p.contact_person, 12),
            p.created,
        );
    }
}

/// Format a single project's details.
pub fn print_project_detail(p: &ProjectRecord) {
    println!("Project: {}", p.name);
    println!("  ID:       {}", p.id);
    println!("  Product:  {}", p.product_name);
    println!("  Genre:    {} ({})", p.genre_name, p.genre_code);
    println!("  Contact:  {}", p.contact_person);
    println!("  Budget:   {}", p.budget);
    println!("  Created:  {}", p.created);
    println!("  Modified: {}", p.modified);
}

/// Format a project's talent lists, newest first.
pub fn print_talent_lists(lists: &[TalentListOption]) {
    if lists.is_empty() {
        println!("No talent lists found.");
        return;
    }

    println!("{} talent list{}:\n", lists.len(), plural(lists.len()));
    for (i, l) in lists.iter().enumerate() {
        println!("  {} {}", cell(&(i + 1).to_string(), 5), l.display_label());
    }
}

/// Format the talents of one list. Long text fields get their own indented
/// lines so line breaks inside them stay readable.
pub fn print_talents(talents: &[TalentRecord]) {
    if talents.is_empty() {
        println!("No talents found.");
        return;
    }

    println!("{} talent{}:\n", talents.len(), plural(talents.len()));

    let mut last_group = "";
    for t in talents {
        if t.group_name != last_group {
            println!("  [{}]", t.group_name);
            last_group = t.group_name.as_str();
        }
        println!(
            "    {} {} age {}  price {}  fee {}  #{}",
            cell(&t.name, 20),
            cell(&t.negotiation_status, 10),
            t.age,
            t.list_price,
            t.fee_range,
            t.sort_order
        );
        for (label, text) in [
            ("Memo", &t.list_memo),
            ("Hobby", &t.hobby),
            ("Skill", &t.skill),
            ("Bio", &t.biography),
            ("Note", &t.talent_memo),
        ] {
            if text.as_str() == PLACEHOLDER {
                continue;
            }
            let mut lines = text.lines();
            if let Some(first) = lines.next() {
                println!("      {label:<6}{first}");
            }
            for line in lines {
                println!("      {:<6}{line}", "");
            }
        }
        println!("      Listed {}", t.listed_on);
    }
}

/// Print the genre mapping in file order.
pub fn print_genres(genres: &GenreMap) {
    if genres.is_empty() {
        println!("No genres loaded.");
        return;
    }
    for name in genres.names() {
        println!("  {}  ({})", cell(name, 24), genres.codes_for(name).join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_wide_characters() {
        assert_eq!(truncate("プロジェクト検索", 8), "プロ...");
        assert_eq!(truncate("short", 8), "short");
    }

    #[test]
    fn cell_pads_by_display_width() {
        assert_eq!(UnicodeWidthStr::width(cell("テスト", 10).as_str()), 10);
        assert_eq!(cell("a\nb", 4), "a b ");
    }
}
