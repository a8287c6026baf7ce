use anyhow::Result;
use chrono::NaiveDate;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use castsearch::genre::GenreMap;
use castsearch::output::csv as csv_out;
use castsearch::output::table;
use castsearch::records::ProjectRecord;
use castsearch::remote::Executor;
use castsearch::search::filters::SearchCriteria;
use castsearch::session::{Notice, Session};

const HELP: &str = "\
Commands:
  set FIELD VALUE   set a search field (project, product, talent, genre,
                    group, contact, price, from, to; dates as YYYY-MM-DD)
  unset FIELD       clear one search field
  reset             clear every search field
  show              print the current search fields
  search            run the project search
  project N         choose project N from the results and load its lists
  list N            choose talent list N and load its talents
  export [PATH]     write the talents (or, before a list is chosen, the
                    projects) to CSV
  genres            print the genre names
  help              print this help
  quit              leave";

/// Interactive loop over one [`Session`]. Reads commands line by line until
/// `quit` or end of input.
pub fn run<R: BufRead>(exec: &dyn Executor, genres: &GenreMap, today: NaiveDate, input: R) -> Result<()> {
    let mut session = Session::new(genres, today);
    println!("castsearch browse ({} backend). Type `help` for commands.", exec.name());
    prompt()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "quit" | "exit" | "q" => break,
            "help" | "?" => println!("{HELP}"),
            "show" => print_criteria(&session.criteria),
            "reset" => {
                session.reset_criteria();
                println!("Search fields cleared.");
            }
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let value = value.trim();
                if value.is_empty() {
                    eprintln!("usage: set FIELD VALUE");
                } else if let Err(msg) = set_field(&mut session.criteria, field, Some(value), genres) {
                    eprintln!("error: {msg}");
                }
            }
            "unset" => {
                if let Err(msg) = set_field(&mut session.criteria, rest, None, genres) {
                    eprintln!("error: {msg}");
                }
            }
            "search" => {
                let notice = session.search(exec);
                table::print_notice(&notice);
                if let Notice::Found(_) = notice {
                    table::print_project_results(session.projects());
                }
            }
            "project" => match pick(rest, session.projects().len()) {
                Some(i) => {
                    let id = session.projects()[i].id.clone();
                    let notice = session.select_project(exec, &id);
                    match newly_selected(&session, &notice) {
                        Some(p) => {
                            println!("Selected {}\n", p.display_label());
                            table::print_project_detail(p);
                            println!();
                            table::print_notice(&notice);
                            table::print_talent_lists(session.talent_lists());
                        }
                        None => table::print_notice(&notice),
                    }
                }
                None => eprintln!("error: choose a project number from the last search"),
            },
            "list" => match pick(rest, session.talent_lists().len()) {
                Some(i) => {
                    let id = session.talent_lists()[i].id.clone();
                    let notice = session.select_talent_list(exec, &id);
                    table::print_notice(&notice);
                    if let Notice::Found(_) = notice {
                        table::print_talents(session.talents());
                    }
                }
                None => eprintln!("error: choose a talent list number of the selected project"),
            },
            "export" => export(&session, rest),
            "genres" => table::print_genres(genres),
            other => eprintln!("error: unknown command `{other}` (try `help`)"),
        }
        prompt()?;
    }
    Ok(())
}

/// The project a `project N` action switched to. A failed action keeps the
/// earlier selection, which must not be announced as the new one.
fn newly_selected<'s>(session: &'s Session<'_>, notice: &Notice) -> Option<&'s ProjectRecord> {
    match notice {
        Notice::Failed(_) => None,
        Notice::Found(_) | Notice::Empty(_) => session.selected_project(),
    }
}

fn prompt() -> Result<()> {
    eprint!("castsearch> ");
    std::io::stderr().flush()?;
    Ok(())
}

/// 1-based row number → index.
fn pick(arg: &str, len: usize) -> Option<usize> {
    let n: usize = arg.parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

fn export(session: &Session<'_>, arg: &str) {
    let explicit = (!arg.is_empty()).then(|| PathBuf::from(arg));
    let result = match (session.selected_project(), session.selected_talent_list()) {
        (Some(project), Some(list)) => {
            if session.talents().is_empty() {
                eprintln!("warning: no talents to export");
                return;
            }
            let path = explicit.unwrap_or_else(|| PathBuf::from(csv_out::talent_export_name(project, list)));
            csv_out::export_csv(session.talents(), &path).map(|_| (path, session.talents().len()))
        }
        _ => {
            if session.projects().is_empty() {
                eprintln!("warning: nothing to export; run `search` first");
                return;
            }
            let path = explicit.unwrap_or_else(|| PathBuf::from(csv_out::PROJECT_EXPORT_NAME));
            csv_out::export_csv(session.projects(), &path).map(|_| (path, session.projects().len()))
        }
    };
    match result {
        Ok((path, n)) => println!("Exported {n} row{} to {}", if n == 1 { "" } else { "s" }, path.display()),
        Err(e) => eprintln!("error: {e:#}"),
    }
}

fn set_field(
    criteria: &mut SearchCriteria,
    field: &str,
    value: Option<&str>,
    genres: &GenreMap,
) -> std::result::Result<(), String> {
    let text = value.map(str::to_string);
    match field {
        "project" => criteria.project_name = text,
        "product" => criteria.product_name = text,
        "talent" => criteria.talent_name = text,
        "group" => criteria.group_name = text,
        "contact" => criteria.contact_person = text,
        "price" => criteria.list_price = text,
        "genre" => {
            if let Some(name) = value {
                if genres.codes_for(name).is_empty() {
                    eprintln!("warning: unknown genre `{name}`; the search will match nothing");
                }
            }
            criteria.genre = text;
        }
        "from" => criteria.created_from = value.map(parse_date).transpose()?,
        "to" => criteria.created_to = value.map(parse_date).transpose()?,
        "" => return Err("missing field name".to_string()),
        other => return Err(format!("unknown field `{other}`")),
    }
    Ok(())
}

pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date `{s}` (expected YYYY-MM-DD): {e}"))
}

fn print_criteria(c: &SearchCriteria) {
    if c.is_empty() {
        println!("No search fields set.");
        return;
    }
    let text = [
        ("project", &c.project_name),
        ("product", &c.product_name),
        ("talent", &c.talent_name),
        ("genre", &c.genre),
        ("group", &c.group_name),
        ("contact", &c.contact_person),
        ("price", &c.list_price),
    ];
    for (label, value) in text {
        if let Some(v) = value {
            println!("  {label:<8}{v}");
        }
    }
    if let Some(d) = c.created_from {
        println!("  {:<8}{d}", "from");
    }
    if let Some(d) = c.created_to {
        println!("  {:<8}{d}", "to");
    }
}
