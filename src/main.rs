use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use show_rota::{
    app::App,
    config::Config,
    persist::{BlobStore, DirBlobStore, MemoryBlobStore},
    process::ShowAvailability,
    schedule::{Assignment, ShowKey, MAX_DOOR},
    serve,
    stats::{self, MonthReport},
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "show-rota", about = "Host and door rota for the comedy nights")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the availability table over HTTP.
    Serve,
    #[command(flatten)]
    Rota(RotaCommand),
}

/// Commands that work on the table and the saved rota.
#[derive(Subcommand)]
enum RotaCommand {
    /// List months found in the availability table.
    Months,
    /// Remember a month for later commands; `--clear` forgets it.
    Select {
        month: Option<String>,
        #[arg(long, conflicts_with = "month")]
        clear: bool,
    },
    /// Shows of a month with everyone who can host or work the door.
    Shows {
        #[arg(long)]
        month: Option<String>,
    },
    /// Set the host of a show; leave the name off to clear it.
    Host { show: String, name: Option<String> },
    /// Add someone to a show's door, or take them off with `--remove`.
    Door {
        show: String,
        name: String,
        #[arg(long)]
        remove: bool,
    },
    /// Unassigned people, understaffed shows and per-person shifts.
    Stats {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,show_rota=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) parse args & pick the table source ──────────────────────
    let cli = Cli::parse();
    let client = Client::new();
    let source = cli
        .config
        .table_source()
        .context("configuring the availability source")?;

    let command = match cli.command {
        Command::Serve => {
            serve::run(source, client, cli.config.port).await;
            return Ok(());
        }
        Command::Rota(command) => command,
    };

    // ─── 3) load table & saved state ────────────────────────────────
    let table = source.fetch_or_empty(&client).await;
    let blobs: Box<dyn BlobStore> = match DirBlobStore::new(&cli.config.state_dir) {
        Ok(store) => Box::new(store),
        Err(e) => {
            error!(error = %e, "state directory unusable; changes will not be kept");
            Box::new(MemoryBlobStore::new())
        }
    };
    let mut app = App::load(table, blobs);

    // ─── 4) run the command ─────────────────────────────────────────
    match command {
        RotaCommand::Months => {
            let selected = app.selected_month();
            for month in app.months() {
                let mark = if Some(month.as_str()) == selected { "*" } else { " " };
                println!("{} {}", mark, month);
            }
        }
        RotaCommand::Select { month, clear } => {
            let month = if clear { String::new() } else { month.unwrap_or_default() };
            if !month.is_empty() && !app.months().contains(&month) {
                bail!("{:?} is not a month in the availability table", month);
            }
            app.select_month(&month);
            match app.selected_month() {
                Some(m) => println!("selected {}", m),
                None => println!("no month selected"),
            }
        }
        RotaCommand::Shows { month } => {
            let month = pick_month(&app, month.as_deref())?;
            let view = app.availability().month_view(&month);
            if view.is_empty() {
                println!("no shows in {}", month);
            }
            for slot in &view {
                print_show(slot, &app.store().assignment(&slot.key()));
            }
        }
        RotaCommand::Host { show, name } => {
            let key = ShowKey::from(show.as_str());
            let slot = show_slot(&app, &key)?;
            let name = name.unwrap_or_default();
            if !name.is_empty() && !slot.host_options().iter().any(|p| p.name == name) {
                bail!("{} is not available to host {}", name, key);
            }
            let assignment = app.set_host(&key, &name);
            print_assignment(&key, &assignment);
        }
        RotaCommand::Door { show, name, remove } => {
            let key = ShowKey::from(show.as_str());
            let slot = show_slot(&app, &key)?;
            if !remove {
                let current = app.store().assignment(&key);
                if !slot.door_options(&current.host).iter().any(|p| p.name == name) {
                    bail!("{} is not available for the door at {}", name, key);
                }
                if current.door_full() && !current.door.contains(&name) {
                    bail!("door at {} already has {} people", key, MAX_DOOR);
                }
            }
            let assignment = app.set_door(&key, &name, !remove);
            print_assignment(&key, &assignment);
        }
        RotaCommand::Stats { month, json } => {
            let report = match month {
                Some(m) => {
                    let m = pick_month(&app, Some(m.as_str()))?;
                    stats::month_report(app.availability(), Some(&m), app.store())
                }
                None => app.report(),
            };
            if json {
                let text = serde_json::to_string_pretty(&report)
                    .context("serializing the report")?;
                println!("{}", text);
            } else {
                print_report(&report);
            }
        }
    }

    info!("done");
    Ok(())
}

/// An explicit month if it exists, else the saved selection.
fn pick_month<S: BlobStore>(app: &App<S>, month: Option<&str>) -> Result<String> {
    match month.or(app.selected_month()) {
        Some(m) if app.months().iter().any(|known| known == m) => Ok(m.to_string()),
        Some(m) => bail!("{:?} is not a month in the availability table", m),
        None => bail!("no month selected; run `show-rota select <month>` or pass --month"),
    }
}

fn show_slot<'a, S: BlobStore>(app: &'a App<S>, key: &ShowKey) -> Result<ShowAvailability<'a>> {
    let show = app
        .availability()
        .find_show(key)
        .with_context(|| format!("no show {:?} in the availability table", key.as_str()))?;
    let available = app.availability().available_for(&show);
    Ok(ShowAvailability { show, available })
}

fn print_show(slot: &ShowAvailability<'_>, assignment: &Assignment) {
    println!("{}", slot.key());

    let hosts: Vec<String> = slot
        .host_options()
        .iter()
        .map(|p| {
            if p.name == assignment.host {
                format!("[{}]", p.name)
            } else {
                p.name.clone()
            }
        })
        .collect();
    if hosts.is_empty() {
        println!("  host: (nobody available)");
    } else {
        println!("  host: {}", hosts.join(", "));
    }

    let full = assignment.door_full();
    let door: Vec<String> = slot
        .door_options(&assignment.host)
        .iter()
        .map(|p| {
            if assignment.door.contains(&p.name) {
                format!("[{}]", p.name)
            } else if full {
                format!("({})", p.name)
            } else {
                p.name.clone()
            }
        })
        .collect();
    println!(
        "  door {}/{}{}: {}",
        assignment.door.len(),
        MAX_DOOR,
        if full { " full" } else { "" },
        door.join(", ")
    );
}

fn print_assignment(key: &ShowKey, assignment: &Assignment) {
    let host = if assignment.has_host() {
        assignment.host.as_str()
    } else {
        "-"
    };
    println!("{}", key);
    println!("  host: {}", host);
    println!("  door: {}", assignment.door.join(", "));
}

fn print_report(report: &MonthReport) {
    println!("Unassigned ({})", report.unassigned_people.len());
    for name in &report.unassigned_people {
        println!("  {}", name);
    }

    println!("Understaffed ({})", report.understaffed_shows.len());
    for show in &report.understaffed_shows {
        let mut missing = Vec::new();
        if show.missing_host {
            missing.push("host");
        }
        if show.missing_door {
            missing.push("door");
        }
        println!("  {} (needs {})", show.show_key, missing.join(" and "));
    }

    println!("Shifts");
    for person in &report.shift_summary {
        println!(
            "  {}: {} shift{} ({} hosting, {} door)",
            person.name,
            person.total_count,
            if person.total_count == 1 { "" } else { "s" },
            person.host_count,
            person.door_count
        );
        for shift in &person.shifts {
            println!("    {} {}", shift.role, shift.show_key);
        }
    }
}
