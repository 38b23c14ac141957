//! # WinCalc CLI Application
//!
//! Command-line front-end over `wincalc_core`: browse the catalog, price a
//! single window, manage projects in a JSON store and export quotes.
//!
//! ```bash
//! wincalc catalog
//! wincalc calc --width 1200 --height 1400 --profile veka-softline-82 --glazing triple-chamber
//! wincalc project new "Miller house"
//! wincalc room add <PROJECT> "Living room" --area 24
//! wincalc window add <PROJECT> <ROOM> --width 1200 --height 1400
//! wincalc export-pdf <PROJECT> --output offer.pdf
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wincalc_core::calculations::{compute_window_stats_with, CalculationReport};
use wincalc_core::catalog::Catalog;
use wincalc_core::errors::{CalcError, CalcResult};
use wincalc_core::file_io::{FileLock, ProjectStore};
use wincalc_core::ids::UuidGenerator;
use wincalc_core::pdf::render_quote_pdf;
use wincalc_core::project::{Project, WindowRequest, DEFAULT_ROOM_HEIGHT_M};
use wincalc_core::quote::Quote;
use wincalc_core::settings::{load_settings, PricingSettings};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "wincalc")]
#[command(about = "WinCalc - window replacement pricing", long_about = None)]
struct Cli {
    /// Project store file
    #[arg(long, global = true, default_value = "wincalc_projects.json")]
    store: PathBuf,

    /// Pricing settings (TOML); defaults are used when omitted or missing
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List frame profiles and glazing units
    Catalog,

    /// Print the effective pricing settings as TOML
    Config,

    /// Calculate a single window without saving it
    Calc {
        #[command(flatten)]
        window: WindowArgs,

        /// Print the JSON report
        #[arg(long)]
        json: bool,
    },

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manage rooms of a project
    #[command(subcommand)]
    Room(RoomCommand),

    /// Manage windows of a room
    #[command(subcommand)]
    Window(WindowCommand),

    /// Show the quote line items of a project
    Quote {
        project: String,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a project's quote as a PDF offer
    ExportPdf {
        project: String,

        /// Output file
        #[arg(short, long, default_value = "offer.pdf")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Create an empty project
    New { name: String },
    /// List all projects, newest first
    List,
    /// Show rooms, windows and totals
    Show {
        project: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a project
    Delete { project: String },
}

#[derive(Subcommand)]
enum RoomCommand {
    /// Add a room
    Add {
        project: String,
        name: String,

        /// Floor area (m²)
        #[arg(long)]
        area: f64,

        /// Ceiling height (m)
        #[arg(long, default_value_t = DEFAULT_ROOM_HEIGHT_M)]
        height: f64,
    },
    /// Remove a room and its windows
    Remove { project: String, room: String },
}

#[derive(Subcommand)]
enum WindowCommand {
    /// Calculate a window and add it to a room
    Add {
        project: String,
        room: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Recalculate a window with new values, keeping its position
    Replace {
        project: String,
        room: String,
        window_id: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Remove a window
    Remove {
        project: String,
        room: String,
        window_id: String,
    },
}

#[derive(Args)]
struct WindowArgs {
    /// Width (mm)
    #[arg(long)]
    width: f64,

    /// Height (mm)
    #[arg(long)]
    height: f64,

    /// Frame profile id (default: first catalog entry)
    #[arg(long)]
    profile: Option<String>,

    /// Glazing id (default: first catalog entry)
    #[arg(long)]
    glazing: Option<String>,
}

impl WindowArgs {
    fn resolve<'a>(&self, catalog: &'a Catalog) -> CalcResult<WindowRequest<'a>> {
        let profile = match &self.profile {
            Some(id) => catalog.profile(id)?,
            None => catalog
                .default_profile()
                .ok_or_else(|| CalcError::catalog_not_found("profile", "<default>"))?,
        };
        let glazing = match &self.glazing {
            Some(id) => catalog.glazing(id)?,
            None => catalog
                .default_glazing()
                .ok_or_else(|| CalcError::catalog_not_found("glazing", "<default>"))?,
        };
        Ok(WindowRequest {
            width_mm: self.width,
            height_mm: self.height,
            profile,
            glazing,
        })
    }
}

/// Shared state for one invocation
struct Context {
    store: ProjectStore,
    settings: PricingSettings,
    catalog: &'static Catalog,
    user: String,
}

impl Context {
    /// Lock the store, load one project, apply `change` and persist the result.
    ///
    /// `change` returns `None` when nothing was modified; the store is then
    /// left untouched.
    fn update_project<T>(
        &self,
        project_id: &str,
        change: impl FnOnce(&mut Project, &Context) -> CalcResult<Option<T>>,
    ) -> CliResult<Option<T>> {
        let _lock = FileLock::acquire(self.store.path(), self.user.as_str())?;
        let mut project = self.store.get_project(project_id)?;
        let outcome = change(&mut project, self)?;
        if outcome.is_some() {
            self.store.persist_project_update(&mut project)?;
            tracing::info!(project = %project.id, "project updated");
        }
        Ok(outcome)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    let settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => PricingSettings::default(),
    };
    let ctx = Context {
        store: ProjectStore::new(cli.store),
        settings,
        catalog: Catalog::builtin(),
        user: std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "wincalc".to_string()),
    };

    match cli.command {
        Commands::Catalog => print_catalog(ctx.catalog),
        Commands::Config => print!("{}", ctx.settings.to_toml()?),
        Commands::Calc { window, json } => calc(&ctx, &window, json)?,
        Commands::Project(command) => project_command(&ctx, command)?,
        Commands::Room(command) => room_command(&ctx, command)?,
        Commands::Window(command) => window_command(&ctx, command)?,
        Commands::Quote { project, json } => {
            let quote = Quote::from_project(&ctx.store.get_project(&project)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                print_quote(&quote);
            }
        }
        Commands::ExportPdf { project, output } => {
            let project = ctx.store.get_project(&project)?;
            let pdf = render_quote_pdf(&Quote::from_project(&project), &project.name)?;
            std::fs::write(&output, pdf)?;
            println!("Wrote {}", output.display());
        }
    }
    Ok(())
}

fn calc(ctx: &Context, args: &WindowArgs, json: bool) -> CliResult<()> {
    let request = args.resolve(ctx.catalog)?;
    let outcome = compute_window_stats_with(
        &ctx.settings,
        request.width_mm,
        request.height_mm,
        request.profile,
        request.glazing,
    );
    let report = CalculationReport::from(&outcome);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} / {}", request.profile.name, request.glazing.name);
    println!("{:.0} x {:.0} mm", request.width_mm, request.height_mm);
    match &report.error_message {
        Some(message) => println!("  INVALID: {}", message),
        None => {
            println!("  Uw:            {:.2} W/m²K", report.overall_u_value);
            println!("  Area:          {:.2} m²", report.area);
            println!("  Price:         {:.0}", report.total_price);
            println!("  Heat loss:     {:.0} kWh/yr", report.annual_heat_loss);
            println!("  Savings:       {:.0} /yr", report.annual_savings);
            if report.is_subsidy_eligible {
                println!("  Subsidy:       {:.0} (eligible)", report.subsidy_amount);
            } else {
                println!("  Subsidy:       not eligible");
            }
        }
    }
    Ok(())
}

fn project_command(ctx: &Context, command: ProjectCommand) -> CliResult<()> {
    match command {
        ProjectCommand::New { name } => {
            let _lock = FileLock::acquire(ctx.store.path(), ctx.user.as_str())?;
            let mut project = ctx.store.create_project(name, &mut UuidGenerator);
            ctx.store.persist_project_update(&mut project)?;
            println!("{}", project.id);
        }
        ProjectCommand::List => {
            let projects = ctx.store.load_projects();
            if projects.is_empty() {
                println!("No projects in {}", ctx.store.path().display());
            }
            for project in projects {
                println!(
                    "{}  {:<30} {:>3} windows  {:>10.0}  updated {}",
                    project.id,
                    project.name,
                    project.window_count(),
                    project.total_cost(),
                    project.updated_at.format("%Y-%m-%d %H:%M"),
                );
            }
        }
        ProjectCommand::Show { project, json } => {
            let project = ctx.store.get_project(&project)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&project)?);
            } else {
                print_project(&project);
            }
        }
        ProjectCommand::Delete { project } => {
            let _lock = FileLock::acquire(ctx.store.path(), ctx.user.as_str())?;
            if ctx.store.delete_project(&project)? {
                println!("Deleted {}", project);
            } else {
                return Err(CalcError::project_not_found(project).into());
            }
        }
    }
    Ok(())
}

fn room_command(ctx: &Context, command: RoomCommand) -> CliResult<()> {
    match command {
        RoomCommand::Add {
            project,
            name,
            area,
            height,
        } => {
            let room_id = ctx.update_project(&project, |project, _| {
                project.add_room(name, area, height, &mut UuidGenerator).map(Some)
            })?;
            if let Some(room_id) = room_id {
                println!("{}", room_id);
            }
        }
        RoomCommand::Remove { project, room } => {
            let removed = ctx.update_project(&project, |project, _| Ok(project.remove_room(&room)))?;
            match removed {
                Some(room) => println!("Removed room '{}' ({} windows)", room.name, room.windows.len()),
                None => println!("No room {} in project", room),
            }
        }
    }
    Ok(())
}

fn window_command(ctx: &Context, command: WindowCommand) -> CliResult<()> {
    match command {
        WindowCommand::Add {
            project,
            room,
            window,
        } => {
            let added = ctx.update_project(&project, |project, ctx| {
                let request = window.resolve(ctx.catalog)?;
                let added = project.add_window(&room, &request, &ctx.settings, &mut UuidGenerator)?;
                Ok(Some((added.id.clone(), added.price)))
            })?;
            if let Some((window_id, price)) = added {
                println!("{}  price {:.0}", window_id, price);
            }
        }
        WindowCommand::Replace {
            project,
            room,
            window_id,
            window,
        } => {
            ctx.update_project(&project, |project, ctx| {
                let request = window.resolve(ctx.catalog)?;
                project
                    .replace_window(&room, &window_id, &request, &ctx.settings, &mut UuidGenerator)
                    .map(Some)
            })?;
            println!("Replaced {}", window_id);
        }
        WindowCommand::Remove {
            project,
            room,
            window_id,
        } => {
            let removed = ctx.update_project(&project, |project, _| Ok(project.remove_window(&room, &window_id)))?;
            match removed {
                Some(window) => println!("Removed {:.0} x {:.0} mm window", window.width, window.height),
                None => println!("No window {} in room {}", window_id, room),
            }
        }
    }
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    println!("Frame profiles:");
    println!("  {:<28} {:<30} {:>6} {:>6} {:>8}", "ID", "NAME", "Uf", "FACE", "PRICE/m²");
    for p in catalog.profiles() {
        println!(
            "  {:<28} {:<30} {:>6.2} {:>6.0} {:>8.0}",
            p.id, p.name, p.frame_u_value, p.visible_face_width_mm, p.price_per_m2
        );
    }
    println!();
    println!("Glazing units:");
    println!("  {:<28} {:<30} {:>6} {:>6} {:>8}", "ID", "NAME", "Ug", "PSI", "PRICE/m²");
    for g in catalog.glazing_units() {
        println!(
            "  {:<28} {:<30} {:>6.2} {:>6.2} {:>8.0}",
            g.id, g.name, g.center_of_glass_u_value, g.edge_thermal_bridge, g.price_per_m2
        );
    }
}

fn print_project(project: &Project) {
    println!("{}  ({})", project.name, project.id);
    println!(
        "created {}, updated {}",
        project.created_at.format("%Y-%m-%d %H:%M"),
        project.updated_at.format("%Y-%m-%d %H:%M")
    );

    for room in &project.rooms {
        println!();
        println!(
            "{}  ({})  {:.1} m², {:.2} m ceiling",
            room.name, room.id, room.area_m2, room.height_m
        );
        if room.windows.is_empty() {
            println!("  (no windows)");
        }
        for window in &room.windows {
            println!(
                "  {}  {:.0} x {:.0} mm  {} / {}  Uw {:.2}  {:.0}{}",
                window.id,
                window.width,
                window.height,
                window.profile_name,
                window.glazing_name,
                window.uw,
                window.price,
                if window.is_subsidy_eligible {
                    format!("  (subsidy {:.0})", window.subsidy)
                } else {
                    String::new()
                },
            );
        }
        println!("  room total {:.0}", room.total_price());
    }

    let totals = project.totals();
    println!();
    println!("Windows:        {} ({:.2} m²)", totals.window_count, totals.window_area_m2);
    println!("Total cost:     {:.0}", totals.total_cost);
    println!("Total subsidy:  {:.0}", totals.total_subsidy);
    println!("Net cost:       {:.0}", totals.net_cost);
    println!("Savings:        {:.0} /yr", totals.annual_savings);
}

fn print_quote(quote: &Quote) {
    if quote.is_empty() {
        println!("(no windows)");
        return;
    }
    for (i, line) in quote.lines.iter().enumerate() {
        println!(
            "{:>3}. {:>5.0} x {:<5.0} {:<30} {:<28} {:>3} x {:>7.0} = {:>8.0}",
            i + 1,
            line.width,
            line.height,
            line.profile_name,
            line.glazing_name,
            line.quantity,
            line.price_per_unit,
            line.total_price,
        );
    }
    println!("Grand total: {:.0}", quote.grand_total);
}
