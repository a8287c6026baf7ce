mod browse;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use castsearch::config::{self, CastConfig, ConnectionOverrides, ConnectionSettings};
use castsearch::genre::GenreMap;
use castsearch::output::{csv as csv_out, json as json_out, table};
use castsearch::remote::fixture::FixtureExecutor;
use castsearch::remote::schema;
use castsearch::remote::ssh::SshExecutor;
use castsearch::remote::Executor;
use castsearch::search::{self, filters::SearchCriteria};
use castsearch::session::{Notice, Session};

#[derive(Parser)]
#[command(name = "castsearch", version, about = "Search casting projects, talent lists and talents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Query a local SQLite fixture instead of the remote database
    #[arg(long, global = true, env = "CASTSEARCH_FIXTURE")]
    fixture: Option<PathBuf>,

    /// Genre mapping JSON (default: ~/.castsearch/product_genre_mapping.json)
    #[arg(long, global = true, env = "CASTSEARCH_GENRES")]
    genres: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

/// Connection overrides; each falls back to its environment variable and then
/// to ~/.castsearch/config.toml.
#[derive(Args, Debug, Default)]
struct ConnectionArgs {
    /// SSH host running the mysql client [EC2_HOSTNAME]
    #[arg(long, global = true)]
    ssh_host: Option<String>,

    /// SSH user [EC2_USERNAME]
    #[arg(long, global = true)]
    ssh_user: Option<String>,

    /// SSH port
    #[arg(long, global = true)]
    ssh_port: Option<u16>,

    /// SSH private key file [EC2_PRIVATE_KEY_PATH]
    #[arg(long, global = true)]
    ssh_key: Option<PathBuf>,

    /// MySQL host as seen from the SSH host [MYSQL_HOST]
    #[arg(long, global = true)]
    mysql_host: Option<String>,

    /// MySQL user [MYSQL_USER]
    #[arg(long, global = true)]
    mysql_user: Option<String>,

    /// MySQL database [MYSQL_DATABASE]
    #[arg(long, global = true)]
    mysql_database: Option<String>,
}

impl From<ConnectionArgs> for ConnectionOverrides {
    fn from(a: ConnectionArgs) -> Self {
        ConnectionOverrides {
            ssh_host: a.ssh_host,
            ssh_user: a.ssh_user,
            ssh_port: a.ssh_port,
            ssh_key_path: a.ssh_key,
            mysql_host: a.mysql_host,
            mysql_user: a.mysql_user,
            mysql_database: a.mysql_database,
        }
    }
}

/// Project search fields. Text is matched as a case-sensitive substring.
#[derive(Args, Debug, Default)]
struct CriteriaArgs {
    /// Project name contains
    #[arg(long)]
    project: Option<String>,

    /// Product name contains
    #[arg(long)]
    product: Option<String>,

    /// A listed talent's name contains
    #[arg(long)]
    talent: Option<String>,

    /// Product genre display name (see `castsearch genres`)
    #[arg(long)]
    genre: Option<String>,

    /// A talent list group name contains
    #[arg(long)]
    group: Option<String>,

    /// Contact person contains
    #[arg(long)]
    contact: Option<String>,

    /// A listed price contains
    #[arg(long)]
    price: Option<String>,

    /// Created on or after (YYYY-MM-DD)
    #[arg(long, value_parser = browse::parse_date)]
    from: Option<chrono::NaiveDate>,

    /// Created on or before (YYYY-MM-DD)
    #[arg(long, value_parser = browse::parse_date)]
    to: Option<chrono::NaiveDate>,
}

impl From<CriteriaArgs> for SearchCriteria {
    fn from(a: CriteriaArgs) -> Self {
        SearchCriteria {
            project_name: a.project,
            product_name: a.product,
            talent_name: a.talent,
            genre: a.genre,
            group_name: a.group,
            contact_person: a.contact,
            list_price: a.price,
            created_from: a.from,
            created_to: a.to,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search projects, most recently created first
    Search {
        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Also export the results to CSV (default: project_search_results.csv)
        #[arg(long, num_args = 0..=1, default_missing_value = csv_out::PROJECT_EXPORT_NAME)]
        csv: Option<PathBuf>,
    },

    /// List a project's talent lists, newest first
    Lists {
        /// Project ID
        project_id: String,
    },

    /// Show the talents on one of a project's talent lists
    Talents {
        /// Project ID
        project_id: String,

        /// Talent list ID
        #[arg(long)]
        list: String,

        /// Also export the talents to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Interactive search: refine fields, pick a project, then a talent list
    Browse,

    /// Print the product genre names and their codes
    Genres,

    /// Create a local SQLite fixture with the casting tables
    InitFixture {
        /// Fixture database path
        path: PathBuf,

        /// Fill it with sample projects and talents
        #[arg(long)]
        demo: bool,
    },

    /// Manage ~/.castsearch/config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented config template if none exists
    Init,
    /// Print the config file with secrets redacted
    Show,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;

    // Commands that never touch the database
    match cli.command {
        Commands::Config { action } => return run_config(action),
        Commands::InitFixture { path, demo } => return init_fixture(&path, demo),
        _ => {}
    }

    let cfg = CastConfig::load()?;
    let genres = load_genres(cli.genres.as_deref(), &cfg)?;

    if let Commands::Genres = cli.command {
        if json_output {
            let entries: Vec<_> = genres
                .entries()
                .map(|(code, name)| serde_json::json!({ "code": code, "name": name }))
                .collect();
            json_out::print_json(&entries)?;
        } else {
            table::print_genres(&genres);
        }
        return Ok(());
    }

    let exec = open_executor(cli.fixture.as_deref(), cli.connection.into(), &cfg)?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Search { criteria, csv } => {
            let mut session = Session::new(&genres, today);
            session.criteria = criteria.into();
            match session.search(exec.as_ref()) {
                Notice::Failed(msg) => bail!(msg),
                notice => table::print_notice(&notice),
            }

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "criteria": session.criteria,
                    "total": session.projects().len(),
                    "projects": session.projects(),
                }))?;
            } else {
                table::print_project_results(session.projects());
            }

            if let Some(path) = csv {
                export(session.projects(), &path)?;
            }
        }

        Commands::Lists { project_id } => {
            let lists = search::list_talent_lists(exec.as_ref(), &project_id)?;
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "project_id": project_id,
                    "total": lists.len(),
                    "talent_lists": lists,
                }))?;
            } else {
                table::print_talent_lists(&lists);
            }
        }

        Commands::Talents { project_id, list, csv } => {
            let talents = search::fetch_talents(exec.as_ref(), &project_id, &list, today)?;
            if talents.is_empty() {
                table::print_notice(&Notice::Empty("No talents on the selected list.".to_string()));
            }
            if json_output {
                json_out::print_json(&serde_json::json!({
                    "project_id": project_id,
                    "talent_list_id": list,
                    "total": talents.len(),
                    "talents": talents,
                }))?;
            } else {
                table::print_talents(&talents);
            }

            if let Some(path) = csv {
                export(&talents, &path)?;
            }
        }

        Commands::Browse => {
            let stdin = std::io::stdin();
            browse::run(exec.as_ref(), &genres, today, stdin.lock())?;
        }

        Commands::Genres | Commands::InitFixture { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn run_config(action: ConfigAction) -> Result<()> {
    let path = config::config_path()?;
    match action {
        ConfigAction::Init => {
            if config::init_config()? {
                println!("Created {}", path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
        ConfigAction::Show => {
            println!("# {}", path.display());
            println!("{}", CastConfig::load()?.display_redacted());
        }
    }
    Ok(())
}

fn init_fixture(path: &Path, demo: bool) -> Result<()> {
    let fixture = FixtureExecutor::create(path)
        .with_context(|| format!("Failed to create fixture: {}", path.display()))?;
    if demo {
        schema::seed_demo(&fixture.conn).context("Failed to load sample data")?;
    }
    println!(
        "Fixture ready: {}{}",
        path.display(),
        if demo { " (with sample data)" } else { "" }
    );
    Ok(())
}

/// An explicitly named mapping must load. A missing default file only means
/// genre names are unavailable.
fn load_genres(cli: Option<&Path>, cfg: &CastConfig) -> Result<GenreMap> {
    let (path, explicit) = config::genre_map_path(cli, cfg)?;
    if !explicit && !path.exists() {
        warn!("No genre mapping at {}; genre names will show as -", path.display());
        return Ok(GenreMap::default());
    }
    let genres = GenreMap::load(&path)?;
    info!("Loaded {} genre codes from {}", genres.len(), path.display());
    Ok(genres)
}

fn open_executor(
    fixture: Option<&Path>,
    overrides: ConnectionOverrides,
    cfg: &CastConfig,
) -> Result<Box<dyn Executor>> {
    if let Some(path) = fixture {
        let exec = FixtureExecutor::open(path)?;
        return Ok(Box::new(exec));
    }
    let settings = ConnectionSettings::resolve(&overrides, cfg)?;
    Ok(Box::new(SshExecutor::new(settings.target, settings.login)))
}

fn export<T: castsearch::output::Tabular>(rows: &[T], path: &Path) -> Result<()> {
    csv_out::export_csv(rows, path)?;
    eprintln!(
        "Exported {} row{} to {}",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" },
        path.display()
    );
    Ok(())
}
